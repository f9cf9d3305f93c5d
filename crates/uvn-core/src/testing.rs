//! Fake interpreters and a fake `uv` for exercising environment operations
//! without network access or real Python installs.

use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::uv::UvTool;

pub(crate) const FULL_VERSION: &str = "cpython-3.12.1-linux-x86_64-gnu";
const PACKAGES_FILE: &str = ".fake-packages";
const TOP_LEVEL_FILE: &str = ".fake-top";
const REQUESTED_PYTHON_FILE: &str = ".requested-python";

pub(crate) struct Sandbox {
    temp: TempDir,
    root: PathBuf,
    python: PathBuf,
}

impl Sandbox {
    pub(crate) fn new() -> Self {
        let temp = tempfile::Builder::new()
            .prefix("uvn-core-")
            .tempdir()
            .expect("tempdir");
        let root = temp.path().join("envs");
        fs::create_dir_all(&root).expect("root");
        let python = temp
            .path()
            .join("pythons")
            .join(FULL_VERSION)
            .join("bin")
            .join("python3.12");
        write_script(&python, "#!/bin/sh\nprintf '3.12.1'\n");
        Self { temp, root, python }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn python(&self) -> &Path {
        &self.python
    }

    pub(crate) fn lock_log(&self) -> PathBuf {
        self.temp.path().join("lock-dirs.log")
    }

    /// Requirements files handed to `uv pip install`, one per line.
    pub(crate) fn install_log(&self) -> PathBuf {
        self.temp.path().join("install-files.log")
    }

    /// Environment linked to the managed interpreter with `packages`
    /// (`name==version`) installed.
    pub(crate) fn env(&self, name: &str, packages: &[&str]) -> PathBuf {
        let path = self.root.join(name);
        fs::create_dir_all(path.join("bin")).expect("bin dir");
        symlink(&self.python, path.join("bin/python")).expect("symlink");
        let mut listing = packages.join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        fs::write(path.join(PACKAGES_FILE), listing).expect("packages");
        path
    }

    /// Restrict what `uv pip tree -d 0` reports for the environment.
    pub(crate) fn set_top_level(&self, env: &Path, lines: &[&str]) {
        fs::write(env.join(TOP_LEVEL_FILE), lines.join("\n") + "\n").expect("top level");
    }

    pub(crate) fn corrupted_env(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        write_script(
            &path.join("bin/python"),
            "#!/bin/sh\necho 'interpreter crashed' >&2\nexit 1\n",
        );
        path
    }

    /// Environment whose interpreter is a plain file rather than a symlink.
    pub(crate) fn unlinked_env(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        write_script(&path.join("bin/python"), "#!/bin/sh\nprintf '3.11.9'\n");
        path
    }

    pub(crate) fn requested_python(&self, name: &str) -> Option<String> {
        self.requested_python_at(&self.root.join(name))
    }

    pub(crate) fn requested_python_at(&self, env: &Path) -> Option<String> {
        fs::read_to_string(env.join(REQUESTED_PYTHON_FILE)).ok()
    }

    pub(crate) fn installed_packages(&self, env: &Path) -> Vec<String> {
        fs::read_to_string(env.join(PACKAGES_FILE))
            .unwrap_or_default()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Default)]
pub(crate) struct FakeUv {
    fail_venv: bool,
    fail_install: bool,
    fail_lock: bool,
}

impl FakeUv {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_venv(mut self) -> Self {
        self.fail_venv = true;
        self
    }

    pub(crate) fn failing_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    pub(crate) fn failing_lock(mut self) -> Self {
        self.fail_lock = true;
        self
    }

    pub(crate) fn install(self, sandbox: &Sandbox) -> UvTool {
        let program = sandbox.temp.path().join("bin").join("uv");
        write_script(&program, &self.script(sandbox));
        UvTool::new(program.display().to_string())
    }

    fn script(&self, sandbox: &Sandbox) -> String {
        let venv_fail = if self.fail_venv {
            "echo 'error: no managed python found' >&2; exit 2"
        } else {
            ":"
        };
        let install_fail = if self.fail_install {
            "echo 'error: failed to download anyio' >&2; exit 1"
        } else {
            ":"
        };
        let lock_fail = if self.fail_lock {
            "echo 'error: resolution failed' >&2; exit 1"
        } else {
            ":"
        };
        format!(
            r#"#!/bin/sh
PYTHON='{python}'
cmd="$1"
shift
case "$cmd" in
venv)
    target=""
    requested=""
    while [ "$#" -gt 0 ]; do
        case "$1" in
            --python) requested="$2"; shift 2 ;;
            --link-mode|--python-preference) shift 2 ;;
            --*) shift ;;
            *) target="$1"; shift ;;
        esac
    done
    {venv_fail}
    mkdir -p "$target/bin"
    ln -s "$PYTHON" "$target/bin/python"
    printf '%s' "$requested" > "$target/{requested}"
    ;;
pip)
    sub="$1"
    shift
    case "$sub" in
    freeze)
        if [ -f "$VIRTUAL_ENV/{packages}" ]; then cat "$VIRTUAL_ENV/{packages}"; fi
        ;;
    tree)
        if [ -f "$VIRTUAL_ENV/{top}" ]; then
            cat "$VIRTUAL_ENV/{top}"
        elif [ -f "$VIRTUAL_ENV/{packages}" ]; then
            sed 's/==/ v/' "$VIRTUAL_ENV/{packages}"
        fi
        ;;
    install)
        echo "$2" >> '{install_log}'
        {install_fail}
        grep -v '^#' "$2" > "$VIRTUAL_ENV/{packages}" || true
        ;;
    esac
    ;;
lock)
    dir="$2"
    echo "$dir" >> '{lock_log}'
    {lock_fail}
    {{ echo 'version = 1'; echo; cat "$dir/pyproject.toml"; }} > "$dir/uv.lock"
    ;;
esac
"#,
            python = sandbox.python().display(),
            requested = REQUESTED_PYTHON_FILE,
            packages = PACKAGES_FILE,
            top = TOP_LEVEL_FILE,
            lock_log = sandbox.lock_log().display(),
            install_log = sandbox.install_log().display(),
        )
    }
}

fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("script dir");
    }
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}
