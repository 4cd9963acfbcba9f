use std::{env, path::PathBuf};

pub fn indy_home_path() -> PathBuf {
    if let Ok(path) = env::var("INDY_HOME") {
        return PathBuf::from(path);
    }

    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/home/indy"));
    path.push(if cfg!(target_os = "ios") {
        "Documents/.indy_client"
    } else {
        ".indy_client"
    });
    path
}

pub fn wallet_home_path() -> PathBuf {
    let mut path = indy_home_path();
    path.push("wallet");
    path
}

pub fn wallet_path(wallet_name: &str) -> PathBuf {
    let mut path = wallet_home_path();
    path.push(wallet_name);
    path
}

pub fn pool_home_path() -> PathBuf {
    let mut path = indy_home_path();
    path.push("pool");
    path
}

pub fn pool_path(pool_name: &str) -> PathBuf {
    let mut path = pool_home_path();
    path.push(pool_name);
    path
}

pub fn tmp_path() -> PathBuf {
    let mut path = env::temp_dir();
    path.push("indy");
    path
}

pub fn tmp_file_path(file_name: &str) -> PathBuf {
    let mut path = tmp_path();
    path.push(file_name);
    path
}
