use crate::e2e::*;

#[test]
fn missing_project_file() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    let out = space.run(&mut minibuild_command(vec![]))?;
    assert_eq!(out.status.code(), Some(1));
    assert_output_contains(&out, "minibuild: error: read build.sdl: ");
    Ok(())
}

#[test]
fn empty_file() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", "")?;
    let out = space.run(&mut minibuild_command(vec![]))?;
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "minibuild: error: no rules in build.sdl\n"
    );
    Ok(())
}

#[test]
fn stale_then_fresh() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("in.c", 100)?;

    let out = space.run_expect(&mut minibuild_command(vec![]))?;
    assert_output_contains(
        &out,
        "build: {in.c} -> {out} via {cc -o out in.c} (needs update)\n",
    );
    assert_output_contains(&out, "minibuild: 1 of 1 rules need update\n");

    space.write_at("out", 150)?;
    let out = space.run_expect(&mut minibuild_command(vec![]))?;
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "build: {in.c} -> {out} via {cc -o out in.c} (does not need update)\n\
         minibuild: no work to do\n"
    );

    // Touching the input makes it stale again.
    space.set_mtime("in.c", 200)?;
    let out = space.run_expect(&mut minibuild_command(vec![]))?;
    assert_output_contains(&out, "(needs update)");
    Ok(())
}

#[test]
fn equal_mtimes_are_fresh() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("in.c", 100)?;
    space.write_at("out", 100)?;
    let out = space.run_expect(&mut minibuild_command(vec![]))?;
    assert_output_contains(&out, "no work to do");
    Ok(())
}

#[test]
fn chdir_and_file_flags() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    std::fs::create_dir(space.path().join("sub"))?;
    space.write("sub/project.sdl", COMPILE_RULE)?;
    space.write_at("sub/in.c", 100)?;
    space.write_at("sub/out", 150)?;
    let out = space.run_expect(&mut minibuild_command(vec![
        "-C",
        "sub",
        "-f",
        "project.sdl",
    ]))?;
    assert_output_contains(&out, "no work to do");
    Ok(())
}

#[test]
fn select_targets() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write(
        "build.sdl",
        "
rule \"a\" { cmd \"touch a.out\"; in \"a.in\"; out \"a.out\" }
rule \"b\" { cmd \"touch b.out\"; in \"b.in\"; out \"b.out\" }
",
    )?;
    space.write_at("a.in", 100)?;
    space.write_at("a.out", 150)?;
    space.write_at("b.in", 100)?;

    let out = space.run_expect(&mut minibuild_command(vec!["a"]))?;
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "a: {a.in} -> {a.out} via {touch a.out} (does not need update)\n\
         minibuild: no work to do\n"
    );

    // Repeated names are checked once, in first-mention order.
    let out = space.run_expect(&mut minibuild_command(vec!["b", "a", "b"]))?;
    assert_eq!(
        std::str::from_utf8(&out.stdout)?,
        "b: {b.in} -> {b.out} via {touch b.out} (needs update)\n\
         a: {a.in} -> {a.out} via {touch a.out} (does not need update)\n\
         minibuild: 1 of 2 rules need update\n"
    );

    let out = space.run(&mut minibuild_command(vec!["c"]))?;
    assert_output_contains(&out, "minibuild: error: unknown rule requested: \"c\"");
    Ok(())
}

#[test]
fn question_mode() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("in.c", 100)?;

    let out = space.run(&mut minibuild_command(vec!["-q"]))?;
    assert_eq!(out.status.code(), Some(1));

    space.write_at("out", 150)?;
    let out = space.run(&mut minibuild_command(vec!["-q"]))?;
    assert_eq!(out.status.code(), Some(0));
    Ok(())
}

#[test]
fn parse_error() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", "rule \"a\" shell=1\n")?;
    let out = space.run(&mut minibuild_command(vec![]))?;
    assert_eq!(out.status.code(), Some(1));
    assert_output_contains(&out, "parse error: attributes are not supported");
    assert_output_contains(&out, "build.sdl:1: rule \"a\" shell=1");
    Ok(())
}

#[test]
fn trace_file() -> anyhow::Result<()> {
    let space = TestSpace::new()?;
    space.write("build.sdl", COMPILE_RULE)?;
    space.write_at("in.c", 100)?;
    space.run_expect(&mut minibuild_command(vec!["-d", "trace"]))?;
    let trace = std::fs::read_to_string(space.path().join("trace.json"))?;
    assert!(trace.contains("\"name\": \"load::read\""));
    assert!(trace.contains("\"name\": \"check\""));
    Ok(())
}
