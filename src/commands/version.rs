use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("supplymon version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
