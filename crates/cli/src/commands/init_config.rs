use dohtunnel_domain::Config;

pub fn init_config(config: &Config, path: &str) -> anyhow::Result<()> {
    if std::path::Path::new(path).exists() {
        anyhow::bail!("{} already exists", path);
    }
    config.save(path)?;
    eprintln!("Configuration written to {}", path);
    Ok(())
}
