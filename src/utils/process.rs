use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Spawn `program` with `args`, write `input` to its stdin and wait for it.
///
/// Fails if the program cannot be started or exits unsuccessfully.
pub fn pipe_to_command(program: &str, args: &[&str], input: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {program}"))?;

    {
        let stdin = child
            .stdin
            .as_mut()
            .with_context(|| format!("no stdin for {program}"))?;
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("failed writing to {program}"))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("failed waiting for {program}"))?;
    if !status.success() {
        anyhow::bail!("{program} exited with {status}");
    }
    Ok(())
}

/// Check whether `program` can be found on `PATH`.
pub fn is_command_available(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return true;
        }
        #[cfg(target_os = "windows")]
        {
            if dir.join(format!("{program}.exe")).is_file() {
                return true;
            }
        }
        false
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_available() {
        assert!(!is_command_available("alertdesk-no-such-tool-xyz"));
    }

    #[test]
    fn pipe_to_missing_program_fails() {
        assert!(pipe_to_command("alertdesk-no-such-tool-xyz", &[], "text").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn pipe_to_cat_succeeds() {
        assert!(pipe_to_command("cat", &[], "hello").is_ok());
    }
}
