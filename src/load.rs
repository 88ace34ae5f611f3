//! Project loading: parses the project file and builds its rules.

use crate::fs::FileSystem;
use crate::node::Value;
use crate::rule::Rule;
use crate::sdl::{self, Tag};
use crate::trace;
use anyhow::{anyhow, bail};
use rustc_hash::{FxHashMap, FxHashSet};

/// The rules of a project, in declaration order.
#[derive(Debug, Default)]
pub struct Project {
    pub rules: Vec<Rule>,
    by_name: FxHashMap<String, usize>,
}

impl Project {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.by_name.get(name).map(|&i| &self.rules[i])
    }
}

/// Internal state used while loading.
struct Loader<'a, F: FileSystem> {
    fs: &'a F,
    project: Project,
    /// Files currently being read, to catch include cycles.
    reading: FxHashSet<String>,
}

impl<'a, F: FileSystem> Loader<'a, F> {
    fn read_file(&mut self, path: &str) -> anyhow::Result<()> {
        if !self.reading.insert(path.to_owned()) {
            bail!("include cycle through {}", path);
        }
        let mut bytes = match trace::scope("fs::read", || self.fs.read(path)) {
            Ok(b) => b,
            Err(e) => bail!("read {}: {}", path, e),
        };
        bytes.push(0);
        self.parse(path, &bytes)?;
        self.reading.remove(path);
        Ok(())
    }

    fn parse(&mut self, filename: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let mut parser = sdl::Parser::new(bytes);
        loop {
            let tag = match parser
                .read()
                .map_err(|err| anyhow!(parser.format_parse_error(filename, err)))?
            {
                None => break,
                Some(t) => t,
            };
            match tag.name.as_str() {
                "rule" => self.add_rule(filename, &tag)?,
                "include" => {
                    let path = match tag.values.as_slice() {
                        [Value::String(path)] if tag.children.is_empty() => path,
                        _ => bail!("{}:{}: include takes one path", filename, tag.line),
                    };
                    trace::scope("include", || self.read_file(path))?;
                }
                name => bail!("{}:{}: unexpected tag {:?}", filename, tag.line, name),
            }
        }
        Ok(())
    }

    fn add_rule(&mut self, filename: &str, tag: &Tag) -> anyhow::Result<()> {
        let rule = match Rule::from_node(tag) {
            Some(r) => r,
            None => bail!(
                "{}:{}: malformed rule: expected one name, at least one cmd, and string values",
                filename,
                tag.line
            ),
        };
        let index = self.project.rules.len();
        if self
            .project
            .by_name
            .insert(rule.name().to_owned(), index)
            .is_some()
        {
            bail!("{}:{}: duplicate rule {:?}", filename, tag.line, rule.name());
        }
        self.project.rules.push(rule);
        Ok(())
    }
}

/// Load a project file, and any files it includes, into rules.
pub fn read<F: FileSystem>(fs: &F, filename: &str) -> anyhow::Result<Project> {
    let mut loader = Loader {
        fs,
        project: Project::default(),
        reading: FxHashSet::default(),
    };
    trace::scope("loader.read_file", || loader.read_file(filename))?;
    Ok(loader.project)
}
