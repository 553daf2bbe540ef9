//! Snippet tests for the block transpiler pipeline as a whole.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    rc::Rc,
};

use block::{
    common::source::Source,
    compiler::{
        build,
        gen,
        normalize,
    },
};

/// Represents specific success/failure modes of a snippet test.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Syntax,
}

impl Outcome {
    pub fn parse(outcome: &str) -> Outcome {
        match outcome {
            "success" => Outcome::Success,
            "syntax" => Outcome::Syntax,
            invalid => {
                println!("invalid: '{}'", invalid);
                panic!("invalid outcome in strat heading");
            },
        }
    }
}

/// Represents what part of the pipeline a snippet tests.
#[derive(Debug)]
pub enum Action {
    Normalize,
    Build,
    Gen,
}

impl Action {
    pub fn parse(action: &str) -> Action {
        match action {
            "normalize" => Action::Normalize,
            "build" => Action::Build,
            "gen" => Action::Gen,
            invalid => {
                println!("invalid: '{}'", invalid);
                panic!("invalid action in strat heading");
            },
        }
    }
}

/// Represents a test strategy for executing a snippet,
/// found at the top of each file.
#[derive(Debug)]
pub struct TestStrat {
    /// How to run the test.
    action: Action,
    /// The expected outcome.
    outcome: Outcome,
    /// The exact python expected, from a sibling `.py`
    /// file. Only checked with `Action::Gen`.
    expect: Option<String>,
}

impl TestStrat {
    /// Uses a heading to construct a test strat
    pub fn heading(heading: HashMap<String, String>, expect: Option<String>) -> TestStrat {
        let mut outcome = None;
        let mut action = None;

        for (strat, result) in heading.iter() {
            match strat.as_str() {
                "outcome" => outcome = Some(Outcome::parse(result)),
                "action" => action = Some(Action::parse(result)),
                invalid => {
                    println!("invalid: '{}'", invalid);
                    panic!("invalid strat in strat heading");
                },
            }
        }

        TestStrat {
            outcome: outcome.expect("no outcome provided"),
            action: action.expect("no action provided"),
            expect,
        }
    }

    /// Parses the test strat from a given snippet. The
    /// heading is the run of `#` comment lines at the top,
    /// which the normalizer drops anyway.
    pub fn snippet(source: &Rc<Source>) -> TestStrat {
        let mut heading = HashMap::new();

        for line in source.contents.lines() {
            let line = match line.strip_prefix('#') {
                Some(line) => line,
                None => break,
            };

            let (strat, result) = line
                .split_once(':')
                .expect("Missing colon in test strat heading");
            if heading
                .insert(strat.trim().to_string(), result.trim().to_string())
                .is_some()
            {
                panic!("Key present twice in test strat heading");
            }
        }

        let expect = fs::read_to_string(source.path.with_extension("py")).ok();
        TestStrat::heading(heading, expect)
    }
}

fn test_snippet(source: Rc<Source>, strat: TestStrat) {
    let result = match strat.action {
        Action::Normalize => normalize(source).map(|_| None),
        Action::Build => build(source).map(|_| None),
        Action::Gen => gen(source).map(Some),
    };

    let actual_outcome = match result {
        Ok(python) => {
            if let (Some(expected), Some(python)) = (&strat.expect, python) {
                if expected != &python {
                    println!("Generated:\n{}", python);
                    println!("Expected:\n{}", expected);
                    panic!("generated python does not match");
                }
            }
            Outcome::Success
        },
        Err(e) => {
            println!("{}", e);
            Outcome::Syntax
        },
    };

    if actual_outcome != strat.outcome {
        println!("expected outcome {:?}", strat.outcome);
        println!("actual outcome {:?}", actual_outcome);
        panic!("test failed, outcomes are not the same");
    }
}

#[test]
fn test_snippets() {
    let paths = fs::read_dir("./tests/snippets")
        .expect("You must be in the base block directory, snippets in ./tests/snippets");

    let mut to_run: Vec<PathBuf> = vec![];
    for path in paths {
        let path = path.expect("Could not read path").path();
        if path.extension().map_or(false, |e| e == "block") {
            to_run.push(path);
        }
    }
    to_run.sort();

    let mut counter = 0;
    println!("\nRunning {} snippet test(s)...", to_run.len());

    while let Some(path) = to_run.pop() {
        println!("test {}: {}...", counter, path.display());

        let source = Source::path(&path).expect("Could not get snippet source");
        let test_strat = TestStrat::snippet(&source);

        test_snippet(source, test_strat);
        counter += 1;
    }

    println!("All tests passed!\n");
}
