//! Tests for behavior around missing files.

use crate::e2e::*;

#[test]
fn missing_input() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("out", 150)?;

    let out = space.run_expect(&mut minibuild_command(vec!["-v"]))?;
    // Invalid rules get no per-output lines.
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "build: {in.c} -> {out} via {cc -o out in.c} (invalid!)\n\
         minibuild: 0 of 1 rules need update, 1 indeterminate\n"
    );
    assert_stderr_contains(&out, "input missing");

    let out = space.run(&mut minibuild_command(vec!["-q"]))?;
    assert_eq!(out.status.code(), Some(1));
    Ok(())
}

#[test]
fn missing_output() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("in.c", 100)?;
    space.write_at("out", 150)?;
    space.remove("out")?;

    let out = space.run_expect(&mut minibuild_command(vec!["-v"]))?;
    assert_output_contains(&out, "* \"out\" nonexistent, needs update.");
    Ok(())
}

#[test]
fn no_inputs() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", "rule \"gen\" { cmd \"date > stamp\"; out \"stamp\" }\n")?;

    let out = space.run_expect(&mut minibuild_command(vec!["-v"]))?;
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "gen: {} -> {stamp} via {date > stamp} (invalid!)\n\
         * \"stamp\" nonexistent, needs update.\n\
         minibuild: 0 of 1 rules need update, 1 indeterminate\n"
    );
    Ok(())
}

#[test]
fn malformed_rule() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", "rule \"empty\" {\n    in \"a\"\n}\n")?;
    let out = space.run(&mut minibuild_command(vec![]))?;
    assert_eq!(out.status.code(), Some(1));
    assert_output_contains(&out, "minibuild: error: build.sdl:1: malformed rule");
    Ok(())
}
