use clap::{Parser, Subcommand};
use lessonsite::{config, lesson, output, render::Renderer, site};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lessonsite")]
#[command(about = "Static content generator for lesson-plan driven course sites")]
#[command(long_about = "\
Static content generator for lesson-plan driven course sites

A lesson plan lists lessons in order; each lesson names a markdown text and a
list of assignment directories. Every build writes one directory per lesson
and per titled assignment, renders assignment pages with embedded code
widgets, and rewrites the site sidebar.

Project structure:

  course/
  ├── lessonsite.toml              # Project settings (optional)
  ├── lesson-plan.yaml             # Lessons, pages, site resources, sidebar head
  ├── config.yml                   # Seed for the theme config (optional)
  ├── README.md                    # Top-level page (listed under pages:)
  ├── lessons/
  │   └── lesson1.md               # Lesson text, front matter title
  ├── assets/                      # Lesson and site resources
  └── docs/src/                    # Site source (output)
      ├── .vuepress/config.yml     # themeConfig.sidebar is rewritten
      └── lessons/<lesson>/<assignment>/index.md

Assignment directories (under the module source root):

  turtle_spiral/
  ├── .assignment.yaml             # title (required), trinket embed options
  ├── trinket.md                   # Page body; no trinket.md = no page
  ├── spiral.py                    # Sources, copied and embeddable
  └── goal.png                     # Resources, copied

Run 'lessonsite gen-config' to generate a documented lessonsite.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (holds lessonsite.toml and the lesson plan)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Root of the assignment source directories
    #[arg(long, env = "MODULE_SOURCE", global = true)]
    module_source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every lesson, assignment page and the sidebar
    Build,
    /// Resolve the lesson plan and assignments without writing anything
    Check,
    /// Print a stock lessonsite.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lessonsite=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut chain = collect_error_chain(&*err).into_iter();
            if let Some(top) = chain.next() {
                eprintln!("Error: {top}");
            }
            for cause in chain {
                eprintln!("  Caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Build => {
            let project = config::load_project(&cli.root, cli.module_source)?;
            let renderer = Renderer::new(project.paths.templates.as_deref())?;
            println!("==> Building {}", project.paths.lesson_plan.display());
            let report = site::build(&project, &renderer)?;
            output::print_build_output(&report, &project.paths.web_src);
            println!("==> Build complete: {}", project.paths.web_src.display());
        }
        Command::Check => {
            let project = config::load_project(&cli.root, cli.module_source)?;
            Renderer::new(project.paths.templates.as_deref())?;
            println!("==> Checking {}", project.paths.lesson_plan.display());
            let lessons = lesson::resolve_lessons(
                &project.plan,
                &project.paths.plan_dir,
                project.paths.module_source.as_deref(),
            )?;
            output::print_check_output(&project, &lessons);
            println!("==> Lesson plan is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}

/// Messages of `err` and each of its sources, outermost first.
fn collect_error_chain(err: &(dyn Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
