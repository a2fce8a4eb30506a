//! Unit tests for module installation.

use std::fs;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct ModulesRoot {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn modules_root() -> ModulesRoot {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("modules")).expect("utf8 temp dir");
    ModulesRoot { _dir: dir, root }
}

#[rstest]
fn installs_jar_and_descriptor(modules_root: ModulesRoot) {
    let installer = ModuleInstaller::new(modules_root.root.clone());
    let spec = ModuleSpec::jdbc_driver("com.mysql", "mysql-connector-java-5.1.36.jar");

    let dir = installer.install(&spec, b"jar-bytes").expect("install");

    assert_eq!(dir, modules_root.root.join("com/mysql/main"));
    assert_eq!(
        fs::read(dir.join("mysql-connector-java-5.1.36.jar")).expect("jar"),
        b"jar-bytes"
    );
    let descriptor = fs::read_to_string(dir.join("module.xml")).expect("descriptor");
    assert!(descriptor.contains("name=\"com.mysql\""));
    assert!(descriptor.contains("<resource-root path=\"mysql-connector-java-5.1.36.jar\"/>"));
    assert!(descriptor.contains("<module name=\"javax.api\"/>"));
    assert!(descriptor.contains("<module name=\"javax.transaction.api\"/>"));
}

#[rstest]
fn refuses_to_overwrite(modules_root: ModulesRoot) {
    let installer = ModuleInstaller::new(modules_root.root.clone());
    let spec = ModuleSpec::jdbc_driver("org.h2", "h2.jar");
    installer.install(&spec, b"first").expect("first install");

    let error = installer.install(&spec, b"second").expect_err("second install");
    assert!(matches!(error, ModuleError::AlreadyExists { .. }));
}

#[rstest]
#[case("com..mysql", "driver.jar")]
#[case("com/mysql", "driver.jar")]
#[case("com.mysql", "../driver.jar")]
#[case("com.mysql", "")]
#[case("com.mysql", "a\"b.jar")]
fn rejects_unsafe_names(modules_root: ModulesRoot, #[case] name: &str, #[case] jar: &str) {
    let installer = ModuleInstaller::new(modules_root.root.clone());
    let error = installer
        .install(&ModuleSpec::jdbc_driver(name, jar), b"")
        .expect_err("invalid name");
    assert!(matches!(error, ModuleError::InvalidName { .. }));
    assert!(!modules_root.root.exists(), "nothing is written");
}
