fn main() -> proxygen_core::Result<()> {
    proxygen_core::Builder::new().source_dir("src").generate()?;
    Ok(())
}
