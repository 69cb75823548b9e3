//! Playground session coordination
//!
//! [`Playground`] owns the source text, the [`Visualizer`] and the [`Config`], and
//! exposes the three user triggers:
//!
//! - [`Playground::initialize_array`]: clear the log and highlight, then seed the
//!   array from the first array literal in the source
//! - [`Playground::load_example`]: replace the source with the bubble-sort sample,
//!   then initialize
//! - [`Playground::run`]: initialize, instrument, parse and execute the source,
//!   returning a [`Session`] describing the attempt
//!
//! No error escapes these operations: extraction, syntax and runtime failures
//! all end up as `Error: <message>` lines in the log.

use crate::config::Config;
use crate::extractor::{self, ExtractionError};
use crate::instrument::{self, Instrumented};
use crate::interpreter::engine::Interpreter;
use crate::memory::value::format_sequence;
use crate::parser::parser::Parser;
use crate::snapshot::Timeline;
use crate::visual::observed::ObservedArray;
use crate::visual::scheduler::Scheduler;
use crate::visual::{DisplayState, Visualizer};
use tracing::{info, warn};

/// Initial editor content when no file is given
pub const PLACEHOLDER_SOURCE: &str = "// Write your algorithm here";

/// The built-in bubble-sort sample
pub const EXAMPLE_BUBBLE_SORT: &str = "// Bubble Sort example
const list = [9, 7, 5, 3, 1, 8, 6, 4, 2, 0];
async function bubbleSort() {
    for (let i = 0; i < list.length - 1; i++) {
        for (let j = 0; j < list.length - i - 1; j++) {
            await highlightElement(j);
            await highlightElement(j + 1);
            if (list[j] > list[j + 1]) {
                const temp = list[j];
                list[j] = list[j + 1];
                list[j + 1] = temp;
                await updateArrayData(list);
            }
        }
    }
}
await bubbleSort();";

pub const SUCCESS_MESSAGE: &str = "Code executed successfully";
pub const NO_ARRAY_MESSAGE: &str = "No array found in the code for visualization.";

/// What array initialization did
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    Initialized(Vec<f64>),
    /// The array was left as it was
    NoArray,
    Failed(ExtractionError),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success,
    Failed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }
}

/// One execution attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The array the wrapper was built from
    pub initial_array: Vec<f64>,
    /// `None` when the run stopped at array extraction
    pub instrumented: Option<Instrumented>,
    pub outcome: RunOutcome,
    /// Statements and loop iterations executed
    pub steps: usize,
}

/// The coordinating object of a playground session
#[derive(Debug)]
pub struct Playground {
    source: String,
    visualizer: Visualizer,
    config: Config,
}

impl Playground {
    /// Create a playground on a virtual clock, starting from the placeholder source
    pub fn new(config: Config) -> Self {
        let visualizer = Visualizer::new(config.pause());
        Self::with_visualizer(config, visualizer)
    }

    /// Create a playground whose pauses run on `scheduler`
    pub fn with_scheduler(config: Config, scheduler: Box<dyn Scheduler>) -> Self {
        let visualizer = Visualizer::with_scheduler(config.pause(), scheduler);
        Self::with_visualizer(config, visualizer)
    }

    fn with_visualizer(config: Config, visualizer: Visualizer) -> Self {
        Playground {
            source: PLACEHOLDER_SOURCE.to_string(),
            visualizer,
            config,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    pub fn state(&self) -> &DisplayState {
        self.visualizer.state()
    }

    pub fn timeline(&self) -> &Timeline {
        self.visualizer.timeline()
    }

    pub fn visualizer(&self) -> &Visualizer {
        &self.visualizer
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clear log and highlight, then seed the array from the source
    pub fn initialize_array(&mut self) -> InitOutcome {
        self.visualizer.reset();

        match extractor::extract(&self.source) {
            Ok(Some(literal)) => {
                self.visualizer.replace_array(literal.values.clone());
                self.visualizer
                    .log(format!("Initialized array: {}", format_sequence(&literal.values)));
                InitOutcome::Initialized(literal.values)
            }
            Ok(None) => {
                self.visualizer.log(NO_ARRAY_MESSAGE);
                InitOutcome::NoArray
            }
            Err(err) => {
                warn!(error = %err, "array extraction failed");
                self.visualizer.log(format!("Error: {}", err));
                InitOutcome::Failed(err)
            }
        }
    }

    /// Replace the source with the bubble-sort sample and initialize from it
    pub fn load_example(&mut self) -> InitOutcome {
        self.source = EXAMPLE_BUBBLE_SORT.to_string();
        self.initialize_array()
    }

    /// Initialize, then execute the instrumented source against a fresh wrapper
    #[tracing::instrument(skip(self), fields(source_len = self.source.len()))]
    pub fn run(&mut self) -> Session {
        if let InitOutcome::Failed(err) = self.initialize_array() {
            return Session {
                initial_array: self.visualizer.state().array.clone(),
                instrumented: None,
                outcome: RunOutcome::Failed(err.to_string()),
                steps: 0,
            };
        }

        let initial_array = self.visualizer.state().array.clone();
        let observed = ObservedArray::new(initial_array.clone(), self.config.intercept);
        let instrumented = instrument::instrument_with_pause(&self.source, self.config.pause_ms);

        let (result, steps) = self.execute(&instrumented.text, observed);
        let outcome = match result {
            Ok(()) => {
                self.visualizer.log(SUCCESS_MESSAGE);
                RunOutcome::Success
            }
            Err(message) => {
                self.visualizer.log(format!("Error: {}", message));
                RunOutcome::Failed(message)
            }
        };
        info!(
            success = outcome.is_success(),
            steps,
            frames = self.visualizer.timeline().len(),
            "run finished"
        );

        Session {
            initial_array,
            instrumented: Some(instrumented),
            outcome,
            steps,
        }
    }

    /// Parse and interpret `text`; any failure comes back as its message
    fn execute(&mut self, text: &str, observed: ObservedArray) -> (Result<(), String>, usize) {
        let program = match Parser::new(text).and_then(|mut parser| parser.parse_program()) {
            Ok(program) => program,
            Err(err) => return (Err(err.to_string()), 0),
        };

        let mut interpreter =
            match Interpreter::new(program, &mut self.visualizer, observed, &self.config) {
                Ok(interpreter) => interpreter,
                Err(err) => return (Err(err.to_string()), 0),
            };
        let result = interpreter.run().map_err(|err| err.to_string());
        (result, interpreter.steps())
    }
}

impl Default for Playground {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
