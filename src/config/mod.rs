//! Kernel configuration: rc file plus environment overlay.

use std::{
    collections::HashMap,
    env, fs,
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use directories::BaseDirs;

const CONFIG_KEYS: &[&str] = &[
    "BOSQUE_COMMAND",
    "NODE_COMMAND",
    "MAIN_JS_FILENAME",
    "EXECUTION_TIMEOUT",
];

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read the rc file if it exists (KEY=VALUE lines, '#' comments)
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self {
            inner: map,
            config_path,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }
}

fn is_config_key(key: &str) -> bool {
    CONFIG_KEYS.contains(&key)
}

fn default_map() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("BOSQUE_COMMAND".to_string(), "bosque".to_string());
    map.insert("NODE_COMMAND".to_string(), "node".to_string());
    map.insert("MAIN_JS_FILENAME".to_string(), "Main.mjs".to_string());
    map.insert("EXECUTION_TIMEOUT".to_string(), "30".to_string());
    map
}

fn default_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        base.config_dir().join("bosque-kernel").join("config")
    } else {
        PathBuf::from(".bosque-kernelrc")
    }
}

/// Typed settings passed explicitly into the wrapper and session constructors
/// so concurrent instances can use different toolchains.
#[derive(Debug, Clone)]
pub struct KernelSettings {
    /// Command or path for the Bosque compiler.
    pub bosque_command: String,
    /// Command or path for the Node.js runtime that executes compiled output.
    pub node_command: String,
    /// Expected entry module emitted by the compiler.
    pub main_js_filename: String,
    /// Budget for one cell execution (compile + run).
    pub timeout: Duration,
}

impl KernelSettings {
    pub fn from_config(cfg: &Config) -> Self {
        let mut settings = Self::default();
        if let Some(v) = cfg.get("BOSQUE_COMMAND") {
            settings.bosque_command = v;
        }
        if let Some(v) = cfg.get("NODE_COMMAND") {
            settings.node_command = v;
        }
        if let Some(v) = cfg.get("MAIN_JS_FILENAME") {
            settings.main_js_filename = v;
        }
        if let Some(secs) = cfg.get_u64("EXECUTION_TIMEOUT") {
            settings.timeout = Duration::from_secs(secs);
        }
        settings
    }
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self {
            bosque_command: "bosque".to_string(),
            node_command: "node".to_string(),
            main_js_filename: "Main.mjs".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
