use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("darkbay-exporter version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
