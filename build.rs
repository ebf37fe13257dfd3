use std::error::Error;
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    // Outside a git checkout vergen emits placeholder values instead of failing.
    EmitBuilder::builder().git_sha(false).emit()?;
    Ok(())
}
