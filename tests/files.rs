// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

use tempfile::TempDir;

/// The smallest useful dump: one module, one wire, two time steps.
pub const MINIMAL: &str = "\
$date
   Test VCD file
$end
$version
   VCD Generator 1.0
$end
$timescale 1ns $end
$scope module testbench $end
$var wire 1 ! sig0 $end
$upscope $end
$enddefinitions $end
$dumpvars
0!
$end
#0
#10
1!
";

/// Two declarations sharing the identifier `!`, plus a vector and a real.
pub const ALIASED: &str = "\
$timescale 10 ps $end
$scope module top $end
$var wire 1 ! clk $end
$var wire 8 \" data [7:0] $end
$var real 64 # temp $end
$scope module core $end
$var wire 1 ! clk_in $end
$upscope $end
$upscope $end
$enddefinitions $end
#0
0!
b0 \"
r20.5 #
#5
1!
hff \"
#10
0!
bx1 \"
r-3e2 #
";

pub const UNMATCHED_SCOPE: &str = "\
$scope module top $end
$scope module inner $end
$var wire 1 ! a $end
$upscope $end
$enddefinitions $end
#0
1!
";

pub const UNMATCHED_UPSCOPE: &str = "\
$scope module top $end
$var wire 1 ! a $end
$upscope $end
$upscope $end
$enddefinitions $end
";

/// Printable identifier for the `n`th signal, counting in base 94 over
/// `!` to `~`.
pub fn identifier(mut n: usize) -> String {
    let mut id = Vec::new();
    loop {
        id.push(b'!' + (n % 94) as u8);
        n /= 94;
        if n == 0 {
            break;
        }
        n -= 1;
    }
    id.reverse();
    String::from_utf8(id).unwrap()
}

/// A dump with `num_signals` single bit wires in one module and
/// `num_timestamps` steps ten units apart, each wire toggling every step.
pub fn generate_test_vcd(num_signals: usize, num_timestamps: usize) -> String {
    let mut vcd = String::new();
    writeln!(vcd, "$date Test VCD file for multithreading $end").unwrap();
    writeln!(vcd, "$version VCD Generator 1.0 $end").unwrap();
    writeln!(vcd, "$timescale 1ns $end").unwrap();
    writeln!(vcd, "$scope module testbench $end").unwrap();
    for i in 0..num_signals {
        writeln!(vcd, "$var wire 1 {} sig{i} $end", identifier(i)).unwrap();
    }
    writeln!(vcd, "$upscope $end").unwrap();
    writeln!(vcd, "$enddefinitions $end").unwrap();

    writeln!(vcd, "$dumpvars").unwrap();
    for i in 0..num_signals {
        writeln!(vcd, "0{}", identifier(i)).unwrap();
    }
    writeln!(vcd, "$end").unwrap();

    for t in 0..num_timestamps {
        writeln!(vcd, "#{}", t * 10).unwrap();
        for i in 0..num_signals {
            let bit = if (t + i) % 2 == 0 { '1' } else { '0' };
            writeln!(vcd, "{bit}{}", identifier(i)).unwrap();
        }
    }
    vcd
}

/// Writes `contents` to `name` inside `dir` and returns the full path.
pub fn write_vcd(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}
