use std::{
    env, fs,
    path::{Path, PathBuf},
};

const METADATA_TABLE: &str = "identity";

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));
    let manifest_path = manifest_dir.join("Cargo.toml");

    println!("cargo:rerun-if-changed={}", manifest_path.display());
    println!("cargo:rerun-if-changed=build.rs");

    let config = load_config(&manifest_path);
    let generated = render(&config);
    fs::write(out_dir.join("identity_generated.rs"), generated)
        .expect("failed to write identity_generated.rs");
}

struct BuildConfig {
    default: String,
    override_envs: Vec<String>,
}

fn load_config(manifest_path: &Path) -> BuildConfig {
    let text = fs::read_to_string(manifest_path)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", manifest_path.display()));
    let manifest: toml::Table = toml::from_str(&text)
        .unwrap_or_else(|error| panic!("failed to parse {}: {error}", manifest_path.display()));

    let table = manifest
        .get("package")
        .and_then(|package| package.get("metadata"))
        .and_then(|metadata| metadata.get(METADATA_TABLE))
        .and_then(toml::Value::as_table)
        .unwrap_or_else(|| panic!("missing [package.metadata.{METADATA_TABLE}] table"));

    let default = table
        .get("default")
        .and_then(toml::Value::as_str)
        .unwrap_or_else(|| panic!("[package.metadata.{METADATA_TABLE}].default must be a string"))
        .trim()
        .to_owned();
    if default.is_empty() || default.chars().any(char::is_whitespace) {
        panic!("default identity {default:?} must be a non-empty name without whitespace");
    }

    let override_envs: Vec<String> = table
        .get("override_envs")
        .and_then(toml::Value::as_array)
        .unwrap_or_else(|| {
            panic!("[package.metadata.{METADATA_TABLE}].override_envs must be an array")
        })
        .iter()
        .map(|value| {
            value
                .as_str()
                .unwrap_or_else(|| panic!("override_envs entries must be strings"))
                .to_owned()
        })
        .collect();

    for name in &override_envs {
        if !is_env_name(name) {
            panic!("override environment variable {name:?} must match [A-Z0-9_]+");
        }
    }

    BuildConfig {
        default,
        override_envs,
    }
}

fn is_env_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'_')
}

fn render(config: &BuildConfig) -> String {
    let envs = config
        .override_envs
        .iter()
        .map(|name| format!("{name:?}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "/// Identity selected when neither the environment nor the filesystem names one.\n\
         pub const DEFAULT_IDENTITY: &str = {default:?};\n\
         \n\
         /// Environment variables consulted, in order, for an explicit identity override.\n\
         pub const OVERRIDE_ENVS: &[&str] = &[{envs}];\n",
        default = config.default,
    )
}
