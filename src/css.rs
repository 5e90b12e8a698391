//! The CSS selector front-end.

mod matcher;
mod parse;
mod token;

#[cfg(test)]
mod tests;

use crate::error::Error;
use crate::select::{validate_list, SelectorList};

/// Compile a CSS selector group into a selector list for the driver.
///
/// Group members are comma separated; the driver unions their results in
/// document order with first occurrence preserved.
pub fn compile(input: &str) -> Result<SelectorList, Error> {
    let list = parse::parse(input)?;
    validate_list(&list)?;
    Ok(list)
}
