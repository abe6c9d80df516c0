use std::env;
use std::fs;

fn main() {
    let defaulted_envs = [("LAUNCHER_NAME", "Launcher")];

    let optional_envs = ["HOME_FOLDER", "EDITION", "ENTRY_POINT", "LATEST_URL", "VERSION"];

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is not set");
    let dest_path = format!("{}/generated.rs", out_dir);

    let mut config_content = String::new();
    for (env, default) in defaulted_envs.iter() {
        println!("cargo:rerun-if-env-changed={}", env);
        let value = env::var(env).unwrap_or_else(|_| default.to_string());
        config_content.push_str(&format!("pub const {}: &str = {:?};\n", env, value));
    }
    for env in optional_envs.iter() {
        println!("cargo:rerun-if-env-changed={}", env);
        match env::var(env) {
            Ok(value) if !value.is_empty() => {
                config_content.push_str(&format!(
                    "pub const {}: Option<&str> = Some({:?});\n",
                    env, value
                ));
            }
            _ => {
                config_content.push_str(&format!("pub const {}: Option<&str> = None;\n", env));
            }
        }
    }
    fs::write(dest_path, config_content).expect("Failed to write generated config");
}
