use anyhow::{bail, Context, Result};
use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use std::{
    fs,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

use keystride::{
    analysis::Analysis,
    clock::{Clock, ManualClock, SystemClock},
    config::{ConfigStore, FileConfigStore, Settings},
    corpus::{self, EmbeddedCorpus, FixedCorpus, WordProvider},
    runtime::{handle_event, CrosstermEventSource, FixedTicker, Flow, Runner},
    script::{Script, DEFAULT_TAIL},
    timer::{Scheduler, TimerQueue},
    word::CharStatus,
    Mode, Phase, Progress, TestConfig, TestResult, TypingTest,
};

const TICK_RATE_MS: u64 = 100;

/// typing-test engine with live wpm/accuracy and detailed results
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Type word sequences under a time or word-count limit and get speed, accuracy, consistency and a per-character error breakdown."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// take a test in the terminal
    Play(TestArgs),
    /// replay a timestamped input script and print the result
    Replay {
        /// script file: `<millis> input "<text>"` / undo / reset / finish per line
        script: PathBuf,

        /// output format
        #[clap(short = 'f', long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        #[clap(flatten)]
        test: TestArgs,
    },
    /// print words drawn from the corpus
    Words(TestArgs),
}

#[derive(Args, Debug, Clone, Default)]
struct TestArgs {
    /// test mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// language to pull words from
    #[clap(short = 'l', long)]
    language: Option<String>,

    /// number of words to draw
    #[clap(short = 'w', long = "words")]
    word_count: Option<usize>,

    /// custom prompt to use instead of the word list
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// seed for reproducible word draws
    #[clap(long)]
    seed: Option<u64>,

    /// remember mode, language, word count and seed as defaults
    #[clap(long)]
    save: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
enum OutputFormat {
    Json,
    Csv,
    Summary,
}

impl TestArgs {
    fn settings(&self, store: &dyn ConfigStore) -> Result<Settings> {
        let mut settings = store.load();
        if let Some(mode) = self.mode {
            settings.mode = mode;
            // a new mode brings its own default word count
            settings.word_count = None;
        }
        if let Some(language) = &self.language {
            settings.language = language.clone();
        }
        if self.word_count.is_some() {
            settings.word_count = self.word_count;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }

        if self.save {
            store
                .save(&settings)
                .context("failed to save settings")?;
        }
        Ok(settings)
    }

    fn provider(&self, settings: &Settings) -> Result<Box<dyn WordProvider>> {
        if let Some(prompt) = &self.prompt {
            return Ok(Box::new(FixedCorpus::from_prompt(prompt)));
        }

        if !corpus::languages().contains(&settings.language) {
            bail!(keystride::Error::UnknownLanguage(settings.language.clone()));
        }
        Ok(match settings.seed {
            Some(seed) => Box::new(EmbeddedCorpus::with_seed(seed)),
            None => Box::new(EmbeddedCorpus::new()),
        })
    }

    fn config(&self, settings: &Settings) -> TestConfig {
        let config = TestConfig::from(settings);
        match &self.prompt {
            // a prompt is typed in full in words mode
            Some(prompt) if settings.word_count.is_none() && config.mode == Mode::Words => {
                let n = prompt.split_whitespace().count();
                config.with_word_count(n)
            }
            _ => config,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keystride=warn")),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let store = FileConfigStore::new();

    match cli.command {
        Command::Play(args) => {
            if !stdin().is_tty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
            }
            let settings = args.settings(&store)?;
            let test = TypingTest::new(
                args.config(&settings),
                args.provider(&settings)?,
                SystemClock::new(),
                TimerQueue::new(),
            );
            play(test)
        }
        Command::Replay {
            script,
            format,
            test: args,
        } => {
            let settings = args.settings(&store)?;
            let source = fs::read_to_string(&script)
                .with_context(|| format!("failed to read {}", script.display()))?;
            let script: Script = source.parse()?;

            let config = args.config(&settings);
            // open-ended runs end at the last scripted step
            let tail = match config.duration {
                Some(_) => DEFAULT_TAIL,
                None => Duration::ZERO,
            };

            let clock = ManualClock::new();
            let mut test = TypingTest::new(
                config,
                args.provider(&settings)?,
                clock.clone(),
                TimerQueue::new(),
            );
            script.run(&mut test, &clock, tail);
            test.finish();

            let Some(result) = test.result() else {
                bail!("the script never started the test");
            };
            print_result(result, test.provider(), format)
        }
        Command::Words(args) => {
            let settings = args.settings(&store)?;
            let config = args.config(&settings);
            let words = args
                .provider(&settings)?
                .words(&config.language, config.word_count);
            println!("{}", words.join(" "));
            Ok(())
        }
    }
}

fn print_result(result: &TestResult, provider: &dyn WordProvider, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record([
                "date",
                "mode",
                "language",
                "duration",
                "wpm",
                "raw_wpm",
                "accuracy",
                "consistency",
                "chars_correct",
                "chars_wrong",
                "chars_total",
            ])?;
            writer.write_record([
                chrono::Local::now().to_rfc3339(),
                result.mode.to_string(),
                result.language.clone(),
                result.duration.to_string(),
                result.wpm.to_string(),
                result.raw_wpm.to_string(),
                format!("{:.1}", result.accuracy),
                format!("{:.1}", result.consistency),
                result.chars_correct.to_string(),
                result.chars_wrong.to_string(),
                result.chars_total.to_string(),
            ])?;
            writer.flush()?;
        }
        OutputFormat::Summary => {
            for line in summary_lines(result, provider) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn summary_lines(result: &TestResult, provider: &dyn WordProvider) -> Vec<String> {
    let analysis = Analysis::of(result, provider);
    let mut lines = vec![
        format!(
            "{} wpm  (raw {})  {:.1}% acc  {:.1}% consistency  {}s",
            result.wpm, result.raw_wpm, result.accuracy, result.consistency, result.duration
        ),
        format!(
            "chars {}/{}/{} (correct/wrong/total)",
            result.chars_correct, result.chars_wrong, result.chars_total
        ),
    ];
    lines.extend(analysis.tips.iter().map(|tip| format!("- {tip}")));
    lines
}

fn play<P, C, S>(mut test: TypingTest<P, C, S>) -> Result<()>
where
    P: WordProvider,
    C: Clock,
    S: Scheduler,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let outcome = event_loop(&mut test, &mut stdout);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    disable_raw_mode()?;
    outcome?;

    if let Some(result) = test.result() {
        let provider = test.provider();
        for line in summary_lines(result, provider) {
            println!("{line}");
        }
    }
    Ok(())
}

fn event_loop<P, C, S>(test: &mut TypingTest<P, C, S>, out: &mut impl Write) -> Result<()>
where
    P: WordProvider,
    C: Clock,
    S: Scheduler,
{
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        draw(test, out)?;
        let event = runner.step();
        if handle_event(test, &event) == Flow::Quit {
            return Ok(());
        }
    }
}

fn draw<P, C, S>(test: &TypingTest<P, C, S>, out: &mut impl Write) -> io::Result<()>
where
    P: WordProvider,
    C: Clock,
    S: Scheduler,
{
    let progress = match test.progress() {
        Progress::Remaining { secs, .. } => format!("{secs}s left"),
        Progress::Words { done, target } => format!("{done}/{target} words"),
        Progress::Elapsed { secs } => format!("{secs}s"),
    };
    let live = match test.phase() {
        Phase::Running => format!("{} wpm  {:.1}%", test.live_wpm(), test.live_accuracy()),
        _ => "-- wpm  --%".to_string(),
    };

    queue!(
        out,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Print(format!("{progress}  {live}")),
        MoveTo(0, 2)
    )?;

    let first = test.active_index().saturating_sub(4);
    for (idx, word) in test.words().iter().enumerate().skip(first).take(24) {
        for slot in word.chars.iter().chain(&word.extras) {
            let text = slot.char.to_string();
            let mut styled = match slot.status {
                CharStatus::Untyped => text.dark_grey(),
                CharStatus::Correct => text.green(),
                CharStatus::Wrong => text.red(),
                CharStatus::Extra => text.dark_red(),
            };
            if idx == test.active_index() {
                styled = styled.underlined();
            }
            queue!(out, PrintStyledContent(styled))?;
        }
        queue!(out, Print(" "))?;
    }

    if let Some(result) = test.result() {
        queue!(out, MoveTo(0, 5))?;
        for line in summary_lines(result, test.provider()) {
            queue!(out, Print(line), Print("\r\n"))?;
        }
        queue!(out, Print("\r\ntab: new test  esc: quit"))?;
    } else {
        queue!(out, MoveTo(0, 5), Print("tab: restart  ctrl+z: undo word  esc: finish/quit"))?;
    }

    out.flush()
}
