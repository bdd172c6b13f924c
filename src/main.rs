use block_codegen::{Error, GenerateOptions, GenerateResult, Palette, Project, generate, source_import, syntax, validate};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "blockgen")]
#[command(about = "Blockgen - turn block projects into indented Python")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Python from .aide project files
    Generate {
        /// Path to .aide file or directory
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read a project from stdin and print the code
        #[arg(long)]
        stdin: bool,

        /// Output as JSON with line mappings (stdin only)
        #[arg(long, requires = "stdin")]
        json: bool,

        /// Project title for the header comment
        #[arg(long)]
        title: Option<String>,
    },
    /// Report graph problems and syntax errors in the generated code
    Check {
        /// Path to .aide file
        file: PathBuf,
    },
    /// Create a project of import blocks from a Python file
    ImportPython {
        /// Python source file
        file: PathBuf,

        /// Where to write the project (default: next to the source)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the block palette
    Palette {
        /// Only list this category
        #[arg(long)]
        category: Option<String>,

        /// Merge a package file before listing
        #[arg(long)]
        package: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Generate { file, stdin, json, title } => {
            if stdin {
                generate_stdin(json, title)
            } else if let Some(path) = file {
                generate_path(&path, title.as_deref())
            } else {
                Err(Error::io("<none>", io::Error::new(io::ErrorKind::InvalidInput, "provide a file/directory or use --stdin")))
            }
        }
        Commands::Check { file } => check_file(&file),
        Commands::ImportPython { file, output } => import_python(&file, output),
        Commands::Palette { category, package } => list_palette(category.as_deref(), package.as_deref()),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}

fn options_for(project: &Project, title: Option<&str>) -> GenerateOptions {
    GenerateOptions::new(title.unwrap_or(&project.name))
}

fn generate_stdin(json_output: bool, title: Option<String>) -> Result<bool, Error> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(|e| Error::io("<stdin>", e))?;

    let project = Project::from_json(&source)?;
    let result = generate(&project.graph, &options_for(&project, title.as_deref()));

    if json_output {
        let json = serde_json::to_string(&result).map_err(block_codegen::ProjectError::from)?;
        println!("{}", json);
    } else {
        print!("{}", result.code);
    }
    Ok(true)
}

fn generate_path(path: &Path, title: Option<&str>) -> Result<bool, Error> {
    if path.is_file() {
        if path.extension().is_none_or(|ext| ext != block_codegen::project::EXTENSION) {
            return Err(Error::io(path, io::Error::new(io::ErrorKind::InvalidInput, "not a .aide project file")));
        }
        let start = Instant::now();
        generate_file(path, title)?;
        print_summary(1, start.elapsed());
        Ok(true)
    } else if path.is_dir() {
        generate_directory(path, title)
    } else {
        Err(Error::io(path, io::Error::new(io::ErrorKind::NotFound, "does not exist")))
    }
}

fn generate_directory(dir: &Path, title: Option<&str>) -> Result<bool, Error> {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == block_codegen::project::EXTENSION))
    {
        match generate_file(entry.path(), title) {
            Ok(_) => file_count += 1,
            Err(err) => {
                print_error(&err);
                failed += 1;
            }
        }
    }

    if file_count == 0 && failed == 0 {
        eprintln!("No .aide files found in {}", dir.display());
        return Ok(false);
    }

    print_summary(file_count, start.elapsed());
    Ok(failed == 0)
}

fn generate_file(path: &Path, title: Option<&str>) -> Result<GenerateResult, Error> {
    let project = Project::load(path)?;
    let result = generate(&project.graph, &options_for(&project, title));

    let output = path.with_extension("py");
    fs::write(&output, &result.code).map_err(|e| Error::io(&output, e))?;
    print_generated(&output.display().to_string());
    if !result.orphans.is_empty() {
        log::warn!(
            "{}: {} unconnected block(s) appended without indentation",
            path.display(),
            result.orphans.len()
        );
    }

    Ok(result)
}

fn check_file(path: &Path) -> Result<bool, Error> {
    let project = Project::load(path)?;
    let result = generate(&project.graph, &GenerateOptions::new(&project.name));
    let diagnostics = validate(&project.graph);
    let issues = syntax::check(&result.code)?;

    let (yellow, red, reset) = if io::stderr().is_terminal() {
        ("\x1b[1;33m", "\x1b[1;31m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    for diagnostic in &diagnostics {
        eprintln!("{}warning:{} {}", yellow, reset, diagnostic);
    }
    for orphan in &result.orphans {
        eprintln!("{}warning:{} block {} is not connected and is emitted unindented", yellow, reset, orphan);
    }
    for issue in &issues {
        eprintln!("{}error:{} {}:{}", red, reset, path.with_extension("py").display(), issue);
    }

    eprintln!(
        "\n{} warning(s), {} syntax error(s) in {}",
        diagnostics.len() + result.orphans.len(),
        issues.len(),
        path.display()
    );
    Ok(issues.is_empty())
}

fn import_python(path: &Path, output: Option<PathBuf>) -> Result<bool, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let parsed = source_import::parse_python(&source)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled Project");
    let name = parsed.project_name().unwrap_or(stem).to_string();
    if let Some(frame) = &parsed.metadata.frame_name {
        log::info!("{}: frame {}", path.display(), frame);
    }
    if let Some(size) = &parsed.metadata.window_size {
        log::info!("{}: window size {}", path.display(), size);
    }
    let import_count = parsed.imports.len();
    let project = Project::new(name, parsed.into_graph());

    let output = output.unwrap_or_else(|| path.with_extension(block_codegen::project::EXTENSION));
    project.save(&output)?;
    print_generated(&output.display().to_string());
    eprintln!("\n✨ Imported {} import statement(s)", import_count);
    Ok(true)
}

fn list_palette(category: Option<&str>, package: Option<&Path>) -> Result<bool, Error> {
    let mut palette = Palette::builtin();
    if let Some(package) = package {
        let json = fs::read_to_string(package).map_err(|e| Error::io(package, e))?;
        let default_category = package
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Custom");
        let (added, used) = palette.merge_package(&json, Some(category.unwrap_or(default_category)))?;
        eprintln!("Added {} block(s) to '{}'", added, used);
    }

    let mut found = false;
    for (name, templates) in palette.categories() {
        if category.is_some_and(|c| c != name) {
            continue;
        }
        found = true;
        println!("{}", name);
        for template in templates {
            println!("  {:<18} {:<9} {}", template.text, template.kind, template.content.replace('\n', "\\n"));
        }
    }

    if !found {
        eprintln!("No category named {}", category.unwrap_or_default());
    }
    Ok(found)
}

fn print_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("\x1b[1;31merror\x1b[0m: \x1b[1m{}\x1b[0m", err);
    } else {
        eprintln!("error: {}", err);
    }
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Generated {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Generated {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
