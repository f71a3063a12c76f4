use std::fs;
use std::io::{BufRead, Write, stdin, stdout};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use barry::{
    Grammar, GrammarError, Info, Layout, LayoutView, Lexer, LineView, Limits, Located, Operator,
    Spelled,
};
use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(version, about = "Parse and evaluate Barry expressions")]
struct Args {
    #[command(flatten)]
    grammar: GrammarArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct GrammarArgs {
    /// Register an extra operator symbol, e.g. `--seal '×=mul'`
    #[arg(long = "seal", value_name = "SYMBOL=OP")]
    seals: Vec<Alias>,

    /// Let a bareword build an operator, e.g. `--name plus=add`
    #[arg(long = "name", value_name = "WORD=OP")]
    names: Vec<Alias>,

    #[arg(long, default_value_t = Limits::DEFAULT.max_depth)]
    max_depth: usize,

    #[arg(long, default_value_t = Limits::DEFAULT.max_steps)]
    max_steps: usize,
}

#[derive(Debug, Clone)]
struct Alias {
    text: String,
    operator: Operator,
}

impl FromStr for Alias {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (text, operator) = s
            .rsplit_once('=')
            .ok_or_else(|| GrammarError::MalformedAlias(s.to_string()))?;
        Ok(Alias {
            text: text.to_string(),
            operator: operator.parse()?,
        })
    }
}

impl GrammarArgs {
    fn build(&self) -> Result<Grammar, GrammarError> {
        let mut grammar = Grammar::default().with_limits(Limits {
            max_depth: self.max_depth,
            max_steps: self.max_steps,
        });
        for alias in &self.seals {
            grammar = grammar.with_seal(&alias.text, alias.operator.constructor())?;
        }
        for alias in &self.names {
            grammar = grammar.with_name(&alias.text, alias.operator.constructor())?;
        }
        Ok(grammar)
    }
}

#[derive(clap::Args, Debug)]
struct LayoutArgs {
    /// One top-level item per line
    #[arg(long, conflicts_with = "break_after")]
    vertical: bool,

    /// Break each line after this many top-level items
    #[arg(long, value_name = "N")]
    break_after: Option<usize>,
}

impl LayoutArgs {
    fn layout(&self) -> Layout {
        match (self.vertical, self.break_after) {
            (true, _) => Layout::Vertical,
            (false, Some(n)) => Layout::BreakAfter(n),
            (false, None) => Layout::Inline,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the raw lexeme stream
    Tokenize { filename: PathBuf },
    /// Print the highlighting spans the parser logs for each line
    Highlight { filename: PathBuf },
    /// Print each line as it was understood
    Parse {
        filename: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Print each line and its value
    Eval { filename: PathBuf },
    /// Read lines from stdin
    Repl,
}

fn read(filename: &Path) -> miette::Result<String> {
    fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))
}

fn report_jams(jams: &[Located], name: &str, line: &str) {
    for located in jams {
        let report = miette::Report::new(located.report(name, line));
        eprintln!("{report:?}");
    }
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let parser = barry::Parser::new(args.grammar.build()?);

    match args.command {
        Commands::Tokenize { filename } => {
            let file_contents = read(&filename)?;
            for (span, lexeme) in Lexer::new(&file_contents, parser.grammar()) {
                let literal = &file_contents[span];
                println!("{}", Spelled { literal, lexeme: &lexeme });
            }
            println!("EOF  null");
        }
        Commands::Highlight { filename } => {
            let file_contents = read(&filename)?;
            for line in file_contents.lines() {
                let parsed = parser.parse_line(line);
                for (span, lexeme) in parsed.spans() {
                    let literal = &line[span.clone()];
                    println!("{:?} {}", span, Spelled { literal, lexeme });
                }
                println!();
            }
        }
        Commands::Parse { filename, layout } => {
            let file_contents = read(&filename)?;
            for (number, line) in file_contents.lines().enumerate() {
                let parsed = parser.parse_line(line);
                let tree = parsed.tree.laid_out(layout.layout());
                println!("{}", LayoutView(&tree));
                report_jams(&parsed.jams, &format!("{}:{}", filename.display(), number + 1), line);
            }
        }
        Commands::Eval { filename } => {
            let file_contents = read(&filename)?;
            for (number, line) in file_contents.lines().enumerate() {
                let parsed = parser.parse(line);
                println!("{} => {}", LineView(&parsed.tree), parsed.tree.eval());
                report_jams(&parsed.jams, &format!("{}:{}", filename.display(), number + 1), line);
            }
        }
        Commands::Repl => {
            let mut lines = stdin().lock().lines();
            loop {
                print!("> ");
                stdout().flush().into_diagnostic()?;
                let Some(line) = lines.next() else {
                    break;
                };
                let line = line.into_diagnostic().wrap_err("reading stdin failed")?;
                if line.trim().is_empty() {
                    continue;
                }
                let parsed = parser.parse(&line);
                println!("{}", LineView(&parsed.tree));
                println!("{}", Info(&parsed.tree));
                report_jams(&parsed.jams, "<stdin>", &line);
            }
            println!();
        }
    }
    Ok(())
}
