use cavo::{
    assets,
    cli::{command, suite},
};
use std::path::PathBuf;

#[test]
fn run_suite_test() -> anyhow::Result<()> {
    assert!(suite::run_suite(
        &assets::default_suite_dir(),
        None,
        command::ClockLimit::default().into_option()
    )?);
    Ok(())
}

#[test]
#[cfg_attr(not(feature = "big_tests"), ignore)]
fn run_suite_bench() -> anyhow::Result<()> {
    assert!(suite::run_suite(
        &["asm", "bench"].iter().collect::<PathBuf>(),
        None,
        command::ClockLimit::default().into_option()
    )?);
    Ok(())
}

#[test]
fn missing_unit_is_an_error() {
    assert!(suite::run_suite(
        &assets::default_suite_dir(),
        Some(&std::ffi::OsString::from("no-such-unit")),
        None
    )
    .is_err());
}
