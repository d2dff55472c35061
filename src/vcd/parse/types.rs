#[derive(Debug, PartialEq)]
pub(super) struct ParseResult<'a> {
    pub(super) matched: &'a str,
    pub(super) residual: &'a str,
}

impl<'a> ParseResult<'a> {
    pub(super) fn assert_match(&self) -> Result<&'a str, String> {
        if self.matched.is_empty() {
            Err("no match".to_string())
        } else {
            Ok(self.matched)
        }
    }
}
