use anyhow::{anyhow, bail};
use argh::FromArgs;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::Path;

use crate::check::{Freshness, RuleCheck};
use crate::fs::RealFileSystem;
use crate::rule::Rule;
use crate::{load, trace};

#[derive(FromArgs)]
/// minibuild, a minimal build tool.  Reports which rules are out of date and why.
struct Opts {
    /// chdir before running
    #[argh(option, short = 'C')]
    chdir: Option<String>,

    /// input project file [default=build.sdl]
    #[argh(option, short = 'f', default = "String::from(\"build.sdl\")")]
    build_file: String,

    /// debugging tools, "-d list" to list
    #[argh(option, short = 'd')]
    debug: Option<String>,

    /// number of rules to check in parallel [default from system]
    #[argh(option, short = 'j')]
    parallelism: Option<usize>,

    /// explain the state of every output
    #[argh(switch, short = 'v')]
    verbose: bool,

    /// question mode: exit 1 unless every requested rule is up to date
    #[argh(switch, short = 'q')]
    question: bool,

    /// rules to check [default=all]
    #[argh(positional)]
    targets: Vec<String>,
}

/// The checked state of one rule, ready to print.
struct Report {
    freshness: Freshness,
    text: String,
}

fn check_rule(rule: &Rule, fs: &RealFileSystem, verbose: bool) -> std::io::Result<Report> {
    let check = RuleCheck::new(rule, fs);
    let text = if verbose {
        check.explain()?
    } else {
        check.summary()?
    };
    Ok(Report {
        freshness: check.freshness()?,
        text,
    })
}

/// Checks rules in parallel; reports come back in the order given.
fn check_rules(
    rules: &[&Rule],
    parallelism: usize,
    verbose: bool,
) -> anyhow::Result<Vec<Report>> {
    let fs = RealFileSystem::new();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()?;
    let reports = pool.install(|| {
        rules
            .par_iter()
            .map(|rule| {
                trace::scope("check", || check_rule(rule, &fs, verbose))
                    .map_err(|err| anyhow!("checking rule {:?}: {}", rule.name(), err))
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;
    Ok(reports)
}

fn run_impl(opts: Opts) -> anyhow::Result<i32> {
    if let Some(debug) = &opts.debug {
        match debug.as_str() {
            "list" => {
                println!("debug tools:");
                println!("  trace  generate json performance trace");
                return Ok(1);
            }
            "trace" => trace::open("trace.json")?,
            _ => bail!("unknown -d {:?}, use -d list to list", debug),
        }
    }

    let parallelism = match opts.parallelism {
        Some(0) => bail!("invalid -j 0, need at least one thread"),
        Some(n) => n,
        None => usize::from(std::thread::available_parallelism()?),
    };

    if let Some(dir) = &opts.chdir {
        let dir = Path::new(dir);
        std::env::set_current_dir(dir).map_err(|err| anyhow!("chdir {:?}: {}", dir, err))?;
    }

    let fs = RealFileSystem::new();
    let project = trace::scope("load::read", || load::read(&fs, &opts.build_file))?;

    let rules: Vec<&Rule> = if opts.targets.is_empty() {
        project.rules.iter().collect()
    } else {
        let mut rules = Vec::new();
        let mut seen = FxHashSet::default();
        for name in &opts.targets {
            let rule = match project.rule(name) {
                Some(rule) => rule,
                None => bail!("unknown rule requested: {:?}", name),
            };
            if seen.insert(name.as_str()) {
                rules.push(rule);
            }
        }
        rules
    };
    if rules.is_empty() {
        bail!("no rules in {}", opts.build_file);
    }

    let reports = trace::scope("check_rules", || {
        check_rules(&rules, parallelism, opts.verbose)
    })?;

    let mut stale = 0;
    let mut indeterminate = 0;
    for (rule, report) in rules.iter().zip(&reports) {
        println!("{}: {}", rule.name(), report.text);
        match report.freshness {
            Freshness::Fresh => {}
            Freshness::Stale => stale += 1,
            Freshness::Indeterminate(_) => indeterminate += 1,
        }
    }

    if stale == 0 && indeterminate == 0 {
        println!("minibuild: no work to do");
        return Ok(0);
    }
    if indeterminate == 0 {
        println!("minibuild: {} of {} rules need update", stale, rules.len());
    } else {
        println!(
            "minibuild: {} of {} rules need update, {} indeterminate",
            stale,
            rules.len(),
            indeterminate
        );
    }
    Ok(if opts.question { 1 } else { 0 })
}

pub fn run() -> anyhow::Result<i32> {
    let args: Vec<String> = std::env::args().collect();
    let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let opts = match Opts::from_args(&["minibuild"], args.get(1..).unwrap_or(&[])) {
        Ok(opts) => opts,
        Err(exit) => {
            return Ok(match exit.status {
                Ok(()) => {
                    println!("{}", exit.output);
                    0
                }
                Err(()) => {
                    eprintln!("{}", exit.output);
                    2
                }
            });
        }
    };
    let res = run_impl(opts);
    trace::close()?;
    res
}
