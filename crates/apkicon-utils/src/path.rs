use std::{env, path::PathBuf};

use crate::error::{PathError, PathResult};

/// Resolves a user supplied path.
///
/// `$VAR` and `${VAR}` are expanded from the environment, a leading `~` is
/// replaced by the home directory, and relative paths are joined onto the
/// current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();

    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);

    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path_buf))
            .map_err(|err| PathError::CurrentDir { source: err })
    }
}

/// Returns the user's home directory from `$HOME`, or the temp dir when unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Returns `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

fn expand_variables(path: &str) -> PathResult<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut var_name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    var_name.push(c);
                }
                if !closed {
                    return Err(PathError::UnclosedVariable {
                        input: format!("${{{var_name}"),
                    });
                }
                push_env_var(&var_name, &mut result, path)?;
            }
            '$' => {
                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    var_name.push(c);
                    chars.next();
                }
                if var_name.is_empty() {
                    result.push('$');
                } else {
                    push_env_var(&var_name, &mut result, path)?;
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn push_env_var(var_name: &str, result: &mut String, original: &str) -> PathResult<()> {
    match var_name {
        "HOME" => result.push_str(&home_dir().to_string_lossy()),
        "XDG_CONFIG_HOME" => result.push_str(&xdg_config_home().to_string_lossy()),
        _ => {
            let value = env::var(var_name).map_err(|_| {
                PathError::MissingEnvVar {
                    input: original.into(),
                    var: var_name.into(),
                }
            })?;
            result.push_str(&value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_variables() {
        env::set_var("APKICON_TEST_DIR", "/srv/uploads");

        assert_eq!(
            expand_variables("$APKICON_TEST_DIR/app.apk").unwrap(),
            "/srv/uploads/app.apk"
        );
        assert_eq!(
            expand_variables("${APKICON_TEST_DIR}/bundle.apks").unwrap(),
            "/srv/uploads/bundle.apks"
        );
        assert_eq!(expand_variables("cost$").unwrap(), "cost$");

        env::remove_var("APKICON_TEST_DIR");
    }

    #[test]
    #[serial]
    fn test_expand_variables_errors() {
        assert!(matches!(
            expand_variables("${APKICON_TEST_DIR"),
            Err(PathError::UnclosedVariable { .. })
        ));
        assert!(matches!(
            expand_variables("$APKICON_SURELY_UNSET_VARIABLE"),
            Err(PathError::MissingEnvVar { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_resolve_path() {
        env::set_var("HOME", "/tmp/home");

        assert!(matches!(resolve_path("  "), Err(PathError::Empty)));
        assert_eq!(
            resolve_path("/absolute/app.apk").unwrap(),
            PathBuf::from("/absolute/app.apk")
        );
        assert_eq!(
            resolve_path("~/icons").unwrap(),
            PathBuf::from("/tmp/home/icons")
        );

        let relative = resolve_path("relative/app.apk").unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("relative/app.apk"));
    }

    #[test]
    #[serial]
    fn test_xdg_config_home() {
        env::set_var("HOME", "/tmp/home");
        env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/home/.config"));

        env::set_var("XDG_CONFIG_HOME", "/tmp/config");
        assert_eq!(xdg_config_home(), PathBuf::from("/tmp/config"));
        env::remove_var("XDG_CONFIG_HOME");
    }
}
