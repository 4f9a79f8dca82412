//! Thompson construction from a syntax tree to an [`Nfa`].

use re_automata_syntax::{Ast, ClassItem, ParserBuilder};

use crate::dfa::Dfa;
use crate::label::Label;
use crate::nfa::{Fragment, Nfa, State, StateId};
use crate::{determinize, minimize, CompileError, CompileResult};

/// The configuration used by a [`Compiler`].
///
/// The limits bound the work a single pattern can cause: group nesting
/// bounds recursion depth, and the size limits bound the number of states
/// that NFA construction and subset construction may allocate.
#[derive(Clone, Debug)]
pub struct Config {
    nest_limit: u32,
    nfa_size_limit: Option<usize>,
    dfa_size_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

impl Config {
    /// Return a new default configuration.
    pub fn new() -> Config {
        Config { nest_limit: 250, nfa_size_limit: None, dfa_size_limit: Some(10_000) }
    }

    /// Set the maximum depth of nested groups accepted by the parser.
    ///
    /// The default is `250`.
    pub fn nest_limit(mut self, limit: u32) -> Config {
        self.nest_limit = limit;
        self
    }

    /// Set the maximum number of NFA states, or `None` for no limit.
    ///
    /// The default is no limit.
    pub fn nfa_size_limit(mut self, limit: Option<usize>) -> Config {
        self.nfa_size_limit = limit;
        self
    }

    /// Set the maximum number of DFA states subset construction may
    /// create, or `None` for no limit.
    ///
    /// Subset construction is exponential in the worst case, so the default
    /// is `Some(10_000)`.
    pub fn dfa_size_limit(mut self, limit: Option<usize>) -> Config {
        self.dfa_size_limit = limit;
        self
    }

    /// Returns the group nesting limit.
    pub fn get_nest_limit(&self) -> u32 {
        self.nest_limit
    }

    /// Returns the NFA size limit.
    pub fn get_nfa_size_limit(&self) -> Option<usize> {
        self.nfa_size_limit
    }

    /// Returns the DFA size limit.
    pub fn get_dfa_size_limit(&self) -> Option<usize> {
        self.dfa_size_limit
    }
}

/// Compiler that converts a syntax tree into a Thompson NFA.
///
/// Every syntax node becomes a fragment with exactly one start and one
/// accepting state; fragments are glued together with `Epsilon` edges.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: Config,
    states: Vec<State>,
    /// Whether some edge already leads into each state.
    entered: Vec<bool>,
}

impl Compiler {
    /// Create a new compiler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the given configuration.
    pub fn configure(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Parse `pattern` and compile it into an NFA.
    pub fn build(self, pattern: &str) -> CompileResult<Nfa> {
        let ast = ParserBuilder::new()
            .nest_limit(self.config.get_nest_limit())
            .build()
            .parse(pattern)?;
        self.compile(&ast)
    }

    /// Parse `pattern` and compile it into its minimal DFA.
    pub fn build_dfa(self, pattern: &str) -> CompileResult<Dfa> {
        let dfa_size_limit = self.config.get_dfa_size_limit();
        let nfa = self.build(pattern)?;
        let dfa = determinize::determinize(&nfa, dfa_size_limit)?;
        minimize::minimize(&dfa)
    }

    /// Compile a syntax tree into a Thompson NFA.
    pub fn compile(mut self, ast: &Ast) -> CompileResult<Nfa> {
        let fragment = self.compile_ast(ast)?;
        debug!(
            "compiled NFA with {} states (start {}, accept {})",
            self.states.len(),
            fragment.start,
            fragment.accept
        );
        Nfa::from_fragment(self.states, fragment)
    }

    fn compile_ast(&mut self, ast: &Ast) -> CompileResult<Fragment> {
        match ast {
            Ast::Char(c) => self.compile_literal(Label::Char(*c)),
            Ast::Any => self.compile_literal(Label::Any),
            Ast::EndOfString => self.compile_literal(Label::EndOfString),
            Ast::PosSet(items) => self.compile_class(items),
            Ast::NegSet(items) => self.compile_literal(Label::not_in(items)?),
            Ast::Or(..) => self.compile_alternation(ast),
            Ast::Concat(..) => self.compile_concat(ast),
            Ast::Kleene(inner) => self.compile_star(inner),
            Ast::Plus(inner) => self.compile_plus(inner),
            Ast::Maybe(inner) => self.compile_question(inner),
            Ast::Group(inner) => self.compile_ast(inner),
            _ => Err(CompileError::Unsupported(format!(
                "no automaton construction for '{}'",
                ast
            ))),
        }
    }

    /// Two states joined by a single edge.
    fn compile_literal(&mut self, label: Label) -> CompileResult<Fragment> {
        let start = self.add_state()?;
        let accept = self.add_state()?;
        self.add_edge(start, label, accept)?;
        Ok(Fragment { start, accept })
    }

    /// Two states joined by one edge per class item. Overlapping items are
    /// split by the transition table.
    fn compile_class(&mut self, items: &[ClassItem]) -> CompileResult<Fragment> {
        let start = self.add_state()?;
        let accept = self.add_state()?;
        for &item in items {
            self.add_edge(start, Label::from_item(item)?, accept)?;
        }
        Ok(Fragment { start, accept })
    }

    /// Alternations nest to the right. The spine is walked iteratively, but
    /// states are allocated in the same order as a recursive descent would:
    /// each entry state and left branch on the way down, the accept states
    /// on the way back up.
    fn compile_alternation(&mut self, ast: &Ast) -> CompileResult<Fragment> {
        let mut branches = vec![];
        let mut node = ast;
        while let Ast::Or(left, right) = node {
            let start = self.add_state()?;
            branches.push((start, self.compile_ast(left)?));
            node = right;
        }
        let mut right = self.compile_ast(node)?;
        while let Some((start, left)) = branches.pop() {
            let accept = self.add_state()?;
            self.add_epsilon(start, left.start)?;
            self.add_epsilon(start, right.start)?;
            self.add_epsilon(left.accept, accept)?;
            self.add_epsilon(right.accept, accept)?;
            right = Fragment { start, accept };
        }
        Ok(right)
    }

    /// Concatenations nest to the right, so the right spine is walked
    /// iteratively to keep recursion depth independent of pattern length.
    fn compile_concat(&mut self, ast: &Ast) -> CompileResult<Fragment> {
        let mut parts = vec![];
        let mut node = ast;
        while let Ast::Concat(left, right) = node {
            parts.push(&**left);
            node = right;
        }
        parts.push(node);

        let first = self.compile_ast(parts[0])?;
        let mut accept = first.accept;
        for part in &parts[1..] {
            let next = self.compile_ast(part)?;
            self.add_epsilon(accept, next.start)?;
            accept = next.accept;
        }
        Ok(Fragment { start: first.start, accept })
    }

    /// `r*`: a dedicated entry state that can skip straight to the accept
    /// state, which loops back to the inner start.
    ///
    /// If the inner accept already has outgoing edges (`(ba*)*`), a skip
    /// into it would let those edges run without reading the rest of `r`,
    /// so a fresh accept state is added after it.
    fn compile_star(&mut self, inner: &Ast) -> CompileResult<Fragment> {
        let start = self.add_state()?;
        let inner = self.compile_ast(inner)?;
        let accept = self.exit_of(inner)?;

        self.add_epsilon(start, inner.start)?;
        self.add_epsilon(start, accept)?;
        self.add_epsilon(accept, inner.start)?;
        Ok(Fragment { start, accept })
    }

    /// `r+`: the inner fragment with a loop from its accept to its start.
    fn compile_plus(&mut self, inner: &Ast) -> CompileResult<Fragment> {
        let inner = self.compile_ast(inner)?;
        self.add_epsilon(inner.accept, inner.start)?;
        Ok(inner)
    }

    /// `r?`: the inner fragment with a skip edge from its start to its
    /// accept.
    ///
    /// The skip edge must not be reachable from inside `r` (`(a+b)?`) and
    /// must not lead back into it (`(ba*)?`). Fresh entry and exit states
    /// are added where the inner fragment's own are already connected.
    fn compile_question(&mut self, inner: &Ast) -> CompileResult<Fragment> {
        let inner = self.compile_ast(inner)?;
        let start = if self.entered[inner.start] {
            let start = self.add_state()?;
            self.add_epsilon(start, inner.start)?;
            start
        } else {
            inner.start
        };
        let accept = self.exit_of(inner)?;
        self.add_epsilon(start, accept)?;
        Ok(Fragment { start, accept })
    }

    /// The accept state of `fragment` if it has no outgoing edges yet,
    /// otherwise a fresh state reached from it.
    fn exit_of(&mut self, fragment: Fragment) -> CompileResult<StateId> {
        if self.states[fragment.accept].transitions().is_empty() {
            return Ok(fragment.accept);
        }
        let accept = self.add_state()?;
        self.add_epsilon(fragment.accept, accept)?;
        Ok(accept)
    }

    fn add_state(&mut self) -> CompileResult<StateId> {
        if let Some(limit) = self.config.get_nfa_size_limit() {
            if self.states.len() >= limit {
                return Err(CompileError::TooComplex { limit });
            }
        }
        let id = self.states.len();
        self.states.push(State::new());
        self.entered.push(false);
        Ok(id)
    }

    fn add_epsilon(&mut self, from: StateId, to: StateId) -> CompileResult<()> {
        if from == to {
            return Err(CompileError::invariant(format!(
                "epsilon self-loop on state {}",
                from
            )));
        }
        self.add_edge(from, Label::Epsilon, to)
    }

    fn add_edge(
        &mut self,
        from: StateId,
        label: Label,
        to: StateId,
    ) -> CompileResult<()> {
        self.states[from].add_transition(label, to)?;
        self.entered[to] = true;
        Ok(())
    }
}
