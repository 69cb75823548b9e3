//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms of the script
//! language. `break` and `continue` are propagated via `LoopBodyResult` so the
//! loop driver can react without inspecting `control_flow` directly.
//!
//! `return` inside a loop body is handled by returning `LoopBodyResult::Exit`,
//! which unwinds the loop and lets the enclosing function see the signal.
//! Every iteration counts against the step budget, so an empty `while (true) {}`
//! still terminates with an error.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::parser::ast::AstNode;

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was triggered; the loop driver should unwind and leave
    /// `self.control_flow` for the caller.
    Exit,
}

impl Interpreter<'_> {
    /// Executes all statements in `body` inside a fresh scope.
    pub(crate) fn execute_loop_body(
        &mut self,
        body: &[AstNode],
    ) -> Result<LoopBodyResult, RuntimeError> {
        self.tick()?;
        self.execute_block(body)?;

        match self.control_flow {
            ControlFlow::Normal => Ok(LoopBodyResult::Continue),
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Continue)
            }
            ControlFlow::Break => {
                self.control_flow = ControlFlow::Normal;
                Ok(LoopBodyResult::Break)
            }
            ControlFlow::Return => Ok(LoopBodyResult::Exit),
        }
    }

    /// Executes a `while (condition) { body }` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        while self.evaluate_expr(condition)?.is_truthy() {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
        }
        Ok(())
    }

    /// Executes a `do { body } while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &[AstNode],
        condition: &AstNode,
    ) -> Result<(), RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }
            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }
        }
        Ok(())
    }

    /// Executes a `for (init; condition; increment) { body }` loop.
    ///
    /// `init`, `condition`, and `increment` are all optional. A missing condition
    /// is treated as always-true. The initializer and loop variable share a
    /// single scope that is exited when the loop ends.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        self.stack.push_scope();
        let result = self.run_for(init, condition, increment, body);
        self.stack.pop_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &[AstNode],
    ) -> Result<(), RuntimeError> {
        if let Some(init) = init {
            self.execute_for_init(init)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    break;
                }
            }

            match self.execute_loop_body(body)? {
                LoopBodyResult::Continue => {}
                LoopBodyResult::Break | LoopBodyResult::Exit => break,
            }

            if let Some(increment) = increment {
                self.evaluate_expr(increment)?;
            }
        }
        Ok(())
    }

    fn execute_for_init(&mut self, init: &AstNode) -> Result<(), RuntimeError> {
        match init {
            AstNode::VarDecl { .. } | AstNode::ExpressionStatement { .. } => {
                self.execute_statements(std::slice::from_ref(init))
            }
            expr => self.evaluate_expr(expr).map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::interpreter::engine::Interpreter;
    use crate::interpreter::errors::RuntimeError;
    use crate::parser::parser::Parser;
    use crate::visual::observed::{InterceptPolicy, ObservedArray};
    use crate::visual::Visualizer;

    fn run(source: &str, config: &Config) -> (Result<(), RuntimeError>, Visualizer) {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut viz = Visualizer::new(config.pause());
        let observed = ObservedArray::new(Vec::new(), InterceptPolicy::Serialized);
        let result = {
            let mut interpreter = Interpreter::new(program, &mut viz, observed, config).unwrap();
            interpreter.run()
        };
        (result, viz)
    }

    #[test]
    fn test_for_loop_with_break_and_continue() {
        let source = "
            let total = 0;
            for (let i = 0; i < 10; i++) {
                if (i == 2) { continue; }
                if (i == 5) { break; }
                total += i;
            }
            log(total);
        ";
        let (result, viz) = run(source, &Config::default());
        result.unwrap();
        // 0 + 1 + 3 + 4
        assert_eq!(viz.state().log, vec!["8"]);
    }

    #[test]
    fn test_while_and_do_while() {
        let source = "
            let n = 0;
            while (n < 3) n++;
            let m = 10;
            do { m++; } while (false);
            log(n, m);
        ";
        let (result, viz) = run(source, &Config::default());
        result.unwrap();
        assert_eq!(viz.state().log, vec!["3 11"]);
    }

    #[test]
    fn test_return_from_inside_loop() {
        let source = "
            function firstOver(limit) {
                for (let i = 0; ; i++) {
                    if (i * i > limit) { return i; }
                }
            }
            log(firstOver(10));
        ";
        let (result, viz) = run(source, &Config::default());
        result.unwrap();
        assert_eq!(viz.state().log, vec!["4"]);
    }

    #[test]
    fn test_infinite_loop_hits_step_limit() {
        let config = Config {
            max_steps: 1_000,
            ..Config::default()
        };
        let (result, _) = run("while (true) {}", &config);
        assert_eq!(result, Err(RuntimeError::StepLimitExceeded { limit: 1_000 }));
    }

    #[test]
    fn test_loop_variable_is_scoped_to_loop() {
        let source = "for (let i = 0; i < 1; i++) {} log(i);";
        let (result, _) = run(source, &Config::default());
        assert!(matches!(result, Err(RuntimeError::UndefinedVariable { ref name, .. }) if name == "i"));
    }
}
