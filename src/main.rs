use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{App, Arg};
use scoped_threadpool::Pool;
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use magic5::{ErrorCallback, Logger, MagicEntry, Offset, ParseError, RuleSet};

/// One compiled magic file.
struct Report {
	path: PathBuf,
	rules: io::Result<RuleSet>,
	failed: usize,
}

fn compile(path: PathBuf, quiet: bool) -> Report {
	let bytes = match fs::read(&path) {
		Ok(x) => x,
		Err(e) => return Report { path, rules: Err(e), failed: 0 },
	};

	let mut failed = 0;
	let rules = {
		let file = path.display().to_string();
		let mut callback = |line: &str, err: &ParseError| {
			failed += 1;
			if !quiet {
				let _span = tracing::warn_span!("compile", file = %file).entered();
				Logger.error(line, err);
			}
		};
		RuleSet::from_u8(&bytes, &mut callback)
	};

	Report { path, rules: Ok(rules), failed }
}

fn offset_text(entry: &MagicEntry) -> String {
	let rel = if entry.add_offset() { "&" } else { "" };
	match *entry.offset() {
		Offset::Direct(off) => format!("{}{}", rel, off),
		Offset::Indirect(ref info) => format!("{}{}", rel, info),
	}
}

fn main() {
	let args = App::new("mdump")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Compiles magic(5) files and prints the rules they define.")
		.arg(Arg::with_name("file")
			.required(true)
			.multiple(true)
			.help("Magic files or directories of them"))
		.arg(Arg::with_name("jobs")
			.short("j")
			.long("jobs")
			.takes_value(true)
			.help("Number of files to compile at once"))
		.arg(Arg::with_name("summary")
			.short("s")
			.long("summary")
			.help("Print one line per file instead of every rule"))
		.arg(Arg::with_name("verbose")
			.short("v")
			.long("verbose")
			.conflicts_with("quiet")
			.help("Log compile progress"))
		.arg(Arg::with_name("quiet")
			.short("q")
			.long("quiet")
			.help("Do not log lines that fail to compile"))
		.get_matches();

	let level = if args.is_present("verbose") { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
		.with_writer(io::stderr)
		.init();

	let jobs = args
		.value_of("jobs")
		.and_then(|j| j.parse::<u32>().ok())
		.filter(|&j| j > 0)
		.unwrap_or_else(|| num_cpus::get() as u32);
	let quiet = args.is_present("quiet");

	let mut files = Vec::<PathBuf>::new();
	for root in args.values_of("file").into_iter().flatten() {
		for entry in WalkDir::new(root).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
			match entry {
				Ok(x) if x.file_type().is_file() => files.push(x.into_path()),
				Ok(_) => {}
				Err(e) => tracing::error!("{}", e),
			}
		}
	}

	let mut reports: Vec<Option<Report>> = files.iter().map(|_| None).collect();
	let mut pool = Pool::new(jobs);
	pool.scoped(|scope| {
		for (slot, path) in reports.iter_mut().zip(files) {
			scope.execute(move || {
				*slot = Some(compile(path, quiet));
			});
		}
	});

	let mut tw = TabWriter::new(io::stdout());
	let mut ok = true;
	let result = if args.is_present("summary") {
		print_summary(&mut tw, reports.iter().flatten(), &mut ok)
	} else {
		print_rules(&mut tw, reports.iter().flatten(), &mut ok)
	};
	if let Err(e) = result.and_then(|_| tw.flush()) {
		tracing::error!("could not write output: {}", e);
		ok = false;
	}

	if !ok {
		std::process::exit(1);
	}
}

fn print_summary<'a, W, I>(out: &mut W, reports: I, ok: &mut bool) -> io::Result<()>
where
	W: Write,
	I: Iterator<Item = &'a Report>,
{
	writeln!(out, "file\trules\troots\tfailed")?;
	for report in reports {
		match report.rules {
			Ok(ref rules) => writeln!(
				out,
				"{}\t{}\t{}\t{}",
				report.path.display(),
				rules.len(),
				rules.roots().len(),
				report.failed
			)?,
			Err(ref e) => {
				tracing::error!("{}: {}", report.path.display(), e);
				*ok = false;
			}
		}
	}
	Ok(())
}

fn print_rules<'a, W, I>(out: &mut W, reports: I, ok: &mut bool) -> io::Result<()>
where
	W: Write,
	I: Iterator<Item = &'a Report>,
{
	writeln!(out, "level\toffset\ttype\ttest\tname\tmime")?;
	for report in reports {
		let rules = match report.rules {
			Ok(ref x) => x,
			Err(ref e) => {
				tracing::error!("{}: {}", report.path.display(), e);
				*ok = false;
				continue;
			}
		};
		for entry in rules.entries() {
			let test = entry
				.test_value()
				.map(|t| t.to_string().escape_debug().to_string())
				.unwrap_or_else(|| "x".to_string());
			writeln!(
				out,
				"{}\t{}\t{}{}\t{}\t{}\t{}",
				entry.level(),
				offset_text(entry),
				if entry.unsigned_type() { "u" } else { "" },
				entry.magic_type(),
				test,
				entry.name().escape_debug(),
				entry.mime_type().unwrap_or("-")
			)?;
		}
	}
	Ok(())
}
