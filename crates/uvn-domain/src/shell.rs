use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Shells with a known activation script in a virtual environment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Csh,
    Tcsh,
    Nu,
    Pwsh,
    Powershell,
    Cmd,
}

impl Shell {
    /// Names accepted by [`Shell::from_str`](std::str::FromStr), in declaration order.
    pub fn names() -> Vec<&'static str> {
        Self::iter().map(<&'static str>::from).collect()
    }

    /// Command that activates the environment at `env` in this shell.
    pub fn activate_command(self, env: &Path) -> String {
        let env = env.display();
        match self {
            Self::Bash | Self::Zsh => format!("source {env}/bin/activate"),
            Self::Fish => format!("source {env}/bin/activate.fish"),
            Self::Csh | Self::Tcsh => format!("source {env}/bin/activate.csh"),
            Self::Nu => format!("source {env}/bin/activate.nu"),
            Self::Pwsh => format!("{env}/bin/Activate.ps1"),
            Self::Powershell => format!("{env}/Scripts/Activate.ps1"),
            Self::Cmd => format!("{env}/Scripts/activate.bat"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn activation_table() {
        let env = Path::new("/home/dev/.virtualenvs/data");
        let expected = [
            (Shell::Bash, "source /home/dev/.virtualenvs/data/bin/activate"),
            (Shell::Zsh, "source /home/dev/.virtualenvs/data/bin/activate"),
            (Shell::Fish, "source /home/dev/.virtualenvs/data/bin/activate.fish"),
            (Shell::Csh, "source /home/dev/.virtualenvs/data/bin/activate.csh"),
            (Shell::Tcsh, "source /home/dev/.virtualenvs/data/bin/activate.csh"),
            (Shell::Nu, "source /home/dev/.virtualenvs/data/bin/activate.nu"),
            (Shell::Pwsh, "/home/dev/.virtualenvs/data/bin/Activate.ps1"),
            (Shell::Powershell, "/home/dev/.virtualenvs/data/Scripts/Activate.ps1"),
            (Shell::Cmd, "/home/dev/.virtualenvs/data/Scripts/activate.bat"),
        ];
        for (shell, command) in expected {
            assert_eq!(shell.activate_command(env), command, "{shell}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for name in Shell::names() {
            let shell = Shell::from_str(name).expect("known shell");
            assert_eq!(shell.to_string(), name);
            assert_eq!(shell.as_ref(), name);
            assert_eq!(<&'static str>::from(shell), name);
        }
        assert!(Shell::from_str("xonsh").is_err());
    }
}
