use std::{env, str::FromStr};

/// Lee una variable de entorno y la parsea; si no está o no parsea, usa `default`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_cae_al_default() {
        assert_eq!(env_or("COMMON_TEST_VAR_QUE_NO_EXISTE", 42u64), 42);

        env::set_var("COMMON_TEST_VAR_BASURA", "no-es-numero");
        assert_eq!(env_or("COMMON_TEST_VAR_BASURA", 7u32), 7);

        env::set_var("COMMON_TEST_VAR_OK", " 15 ");
        assert_eq!(env_or("COMMON_TEST_VAR_OK", 7u32), 15);
    }
}
