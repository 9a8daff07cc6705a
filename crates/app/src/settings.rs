//! 配置加载：内置默认值 → `config/default.toml` → `STROMPREIS_CONFIG` 指向的文件 → 环境变量。

use config::{Config, ConfigError, Environment, File};
use strompreis_core::config::AppConfig;

/// 可选的默认配置文件 (相对工作目录，不带扩展名)
const DEFAULT_CONFIG_FILE: &str = "config/default";
/// 指定额外配置文件路径的环境变量
const CONFIG_PATH_ENV: &str = "STROMPREIS_CONFIG";
const ENV_PREFIX: &str = "STROMPREIS";

/// # Summary
/// 按优先级合并所有配置来源。
///
/// # Logic
/// 1. 未出现的字段由 `AppConfig` 的 serde 默认值补齐。
/// 2. 后加入的来源覆盖先加入的来源。
/// 3. 环境变量形如 `STROMPREIS__SERVER__PORT=9000`。
pub fn load() -> Result<AppConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        builder = builder.add_source(File::with_name(&path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins"),
        )
        .build()?
        .try_deserialize()
}
