//! End-to-end tests invoking the compiled binary with `assert_cmd`.

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{BASIC_TEMPLATE, Project, make_available};

const DEFAULT_MAKEFILE: &str = concat!(
    "config ?= debug\n",
    "build_dir := build/$(config)\n",
    "${build_dir}/client_src/main.o: client_src/main.cpp | ${build_dir}/client_src\n",
    "\t${cpp_compiler} ${client_compile_flags} -c client_src/main.cpp -o ${build_dir}/client_src/main.o\n",
    "${build_dir}/client_src:\n",
    "\tmkdir -p $@\n",
    "${build_dir}/client_src/net/io.o: client_src/net/io.cpp | ${build_dir}/client_src/net\n",
    "\t${cpp_compiler} ${client_compile_flags} -c client_src/net/io.cpp -o ${build_dir}/client_src/net/io.o\n",
    "${build_dir}/client_src/net:\n",
    "\tmkdir -p $@\n",
    "${build_dir}/client: ${build_dir}/client_src/main.o ${build_dir}/client_src/net/io.o | ${build_dir}\n",
    "\t${linker} ${build_dir}/client_src/main.o ${build_dir}/client_src/net/io.o ${client_link_flags} -o ${build_dir}/client\n",
    "${build_dir}:\n",
    "\tmkdir -p $@\n",
    "deps:=${build_dir}/client_src/main.d ${build_dir}/client_src/net/io.d \n",
    "-include $(deps)\n",
);

fn default_project() -> Result<Project> {
    Project::with_sources(
        &["client_src/net/io.cpp", "client_src/main.cpp", "client_src/notes.txt"],
        BASIC_TEMPLATE,
    )
}

fn genmake() -> Result<Command> {
    Command::cargo_bin("genmake").context("locate genmake binary")
}

#[test]
fn default_run_writes_makefile_and_prints_hint() -> Result<()> {
    let project = default_project()?;
    genmake()?
        .current_dir(project.root())
        .assert()
        .success()
        .stdout(predicate::str::contains("build with: make config=debug|release"));
    assert_eq!(project.read("makefile")?, DEFAULT_MAKEFILE);
    Ok(())
}

#[test]
fn directory_flag_matches_running_inside_project() -> Result<()> {
    let project = default_project()?;
    let elsewhere = tempfile::tempdir().context("create working dir")?;
    genmake()?
        .current_dir(elsewhere.path())
        .arg("-C")
        .arg(project.root())
        .assert()
        .success();
    assert_eq!(project.read("makefile")?, DEFAULT_MAKEFILE);
    Ok(())
}

#[test]
fn dot_relative_directory_flag_keeps_rules_relative() -> Result<()> {
    let project = default_project()?;
    let parent = project.root().parent().context("project has a parent")?;
    let name = project.root().file_name().context("project has a name")?;
    genmake()?
        .current_dir(parent)
        .arg("-C")
        .arg(format!("./{name}"))
        .assert()
        .success();
    assert_eq!(project.read("makefile")?, DEFAULT_MAKEFILE);
    Ok(())
}

#[test]
fn rerunning_replaces_previous_output() -> Result<()> {
    let project = default_project()?;
    project.write("makefile", "stale\n")?;
    genmake()?.current_dir(project.root()).assert().success();
    genmake()?.current_dir(project.root()).assert().success();
    assert_eq!(project.read("makefile")?, DEFAULT_MAKEFILE);
    Ok(())
}

#[test]
fn missing_template_fails() -> Result<()> {
    let project = Project::new()?;
    project.write("client_src/main.cpp", "")?;
    genmake()?
        .current_dir(project.root())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
    ensure!(!project.path("makefile").exists(), "makefile should not be written");
    Ok(())
}

#[test]
fn template_without_body_line_fails() -> Result<()> {
    let project = Project::with_sources(&["client_src/main.cpp"], "all:\n\techo none\n")?;
    genmake()?
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("#body"));
    ensure!(!project.path("makefile").exists(), "makefile should not be written");
    Ok(())
}

#[test]
fn missing_source_root_fails() -> Result<()> {
    let project = Project::with_sources(&[], BASIC_TEMPLATE)?;
    genmake()?.current_dir(project.root()).assert().failure();
    Ok(())
}

#[test]
fn unknown_profile_fails() -> Result<()> {
    let project = default_project()?;
    project.write("genmake.yml", "profiles:\n  release:\n    compile_flags: -O2\n")?;
    genmake()?
        .current_dir(project.root())
        .args(["--profile", "fast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fast"));
    Ok(())
}

#[test]
fn binary_named_like_an_output_directory_fails() -> Result<()> {
    let project = default_project()?;
    project.write("genmake.yml", "binary: client_src\n")?;
    genmake()?
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already produced by another rule"));
    ensure!(!project.path("makefile").exists(), "makefile should not be written");
    Ok(())
}

#[test]
fn explicit_config_must_exist() -> Result<()> {
    let project = default_project()?;
    genmake()?
        .current_dir(project.root())
        .args(["--config", "absent.yml"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn configuration_and_flags_shape_the_output() -> Result<()> {
    let project = Project::with_sources(&["src/lib.cc", "src/util.cc"], "#body\n")?;
    project.write(
        "genmake.yml",
        concat!(
            "sources:\n",
            "  root: src\n",
            "build_dir: out\n",
            "binary: libutil.a\n",
            "toolchain:\n",
            "  compiler: c++\n",
            "  compile_flags: -MMD\n",
            "profiles:\n",
            "  release:\n",
            "    compile_flags: -O2 -MMD\n",
        ),
    )?;
    genmake()?
        .current_dir(project.root())
        .args(["--ext", "cc", "--archive", "--profile", "release", "-o", "GNUmakefile"])
        .assert()
        .success();
    let makefile = project.read("GNUmakefile")?;
    ensure!(
        makefile.contains("\tc++ -O2 -MMD -c src/lib.cc -o out/src/lib.o\n"),
        "compile recipe missing:\n{makefile}"
    );
    ensure!(
        makefile.contains("\tar rcs out/libutil.a out/src/lib.o out/src/util.o\n"),
        "archive recipe missing:\n{makefile}"
    );
    ensure!(!project.path("makefile").exists(), "default output should be untouched");
    Ok(())
}

#[test]
fn invalid_config_reports_file_name() -> Result<()> {
    let project = default_project()?;
    project.write("genmake.yml", "toolchain: [unterminated\n")?;
    genmake()?
        .current_dir(project.root())
        .assert()
        .failure()
        .stderr(predicate::str::contains("genmake.yml"));
    Ok(())
}

#[test]
fn generated_makefile_is_accepted_by_make() -> Result<()> {
    if !make_available() {
        return Ok(());
    }
    let project = Project::with_sources(
        &["src/main.cpp", "src/net/io.cpp"],
        concat!("all: build/client\n", "#body\n", "-include $(deps)\n"),
    )?;
    project.write(
        "genmake.yml",
        concat!(
            "sources:\n",
            "  root: src\n",
            "build_dir: build\n",
            "toolchain:\n",
            "  compiler: c++\n",
            "  compile_flags: -MMD\n",
            "  linker: c++\n",
            "  link_flags: -lm\n",
        ),
    )?;
    genmake()?.current_dir(project.root()).assert().success();

    let output = std::process::Command::new("make")
        .arg("-n")
        .current_dir(project.root())
        .output()
        .context("run make -n")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    ensure!(
        output.status.success(),
        "make -n failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    for line in [
        "mkdir -p build/src",
        "c++ -MMD -c src/main.cpp -o build/src/main.o",
        "mkdir -p build/src/net",
        "c++ -MMD -c src/net/io.cpp -o build/src/net/io.o",
        "c++ build/src/main.o build/src/net/io.o -lm -o build/client",
    ] {
        ensure!(stdout.contains(line), "make -n output lacks `{line}`:\n{stdout}");
    }
    Ok(())
}
