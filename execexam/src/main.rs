use execexam::args::{OutputFormat, ParsedArgs};
use execexam::collector::DiagnosticsContext;
use execexam::debug::{DebugLog, DebugMessage};
use execexam::diagnostics_trace::{RunCounts, RunStart, maybe_write_run_trace};
use execexam::events::EventStreamAdapter;
use execexam::pipeline::diagnose;

fn main() {
    let started_at = RunStart::now();
    let parsed = match execexam::args::parse_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    std::process::exit(run(&parsed, started_at));
}

fn run(parsed: &ParsedArgs, started_at: RunStart) -> i32 {
    let mut debug = DebugLog::new(parsed.debug);
    debug.record(DebugMessage::ParameterCheckPassed);

    let cwd = std::env::current_dir()
        .map(|dir| dunce::canonicalize(&dir).unwrap_or(dir))
        .unwrap_or_else(|_| std::path::PathBuf::from("."));
    let repo_root = execexam::config::find_repo_root(&cwd);
    let cfg = match execexam::config::load_execexam_config(&repo_root) {
        Ok(cfg) => {
            debug.record(DebugMessage::ConfigLoaded);
            cfg
        }
        Err(err) => {
            eprintln!("execexam: {err}");
            Default::default()
        }
    };
    let settings = parsed.settings(&cfg);
    if settings.verbose {
        eprintln!(
            "execexam: repo_root={} report={} events={:?}",
            repo_root.to_string_lossy(),
            parsed.report.to_string_lossy(),
            parsed.events
        );
    }

    let report = match execexam::report::load_run_report(&parsed.report) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    debug.record(DebugMessage::ReportLoaded);

    let mut context = DiagnosticsContext::new();
    let mut adapter = EventStreamAdapter::new(settings.verbose);
    if let Some(events_path) = parsed.events.as_deref() {
        match std::fs::read_to_string(events_path) {
            Ok(text) => {
                adapter.consume(&mut context, &text);
                debug.record(DebugMessage::EventsReplayed);
            }
            Err(err) => eprintln!("execexam: cannot read {}: {err}", events_path.display()),
        }
    }
    let counts_from_adapter = (adapter.dispatched(), adapter.malformed());
    let console_output = adapter.finish();

    let diagnosis = match diagnose(&report, &context, &console_output, &settings) {
        Ok(diagnosis) => diagnosis,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    debug.record(DebugMessage::TracebacksNormalized);
    if diagnosis.snippets.iter().any(|s| !s.lines.is_empty()) {
        debug.record(DebugMessage::SnippetsExtracted);
    }

    match parsed.format {
        OutputFormat::Text => print!("{}", diagnosis.render_text()),
        OutputFormat::Json => match serde_json::to_string_pretty(&diagnosis) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("execexam: {err}");
                return 1;
            }
        },
    }
    if debug.has_messages() {
        eprint!("{}", debug.render());
    }

    let counts = RunCounts {
        tests: report.tests.len(),
        failing_tests: diagnosis.failing_tests.len(),
        tracebacks: diagnosis.tracebacks.len(),
        events_dispatched: counts_from_adapter.0,
        events_malformed: counts_from_adapter.1,
    };
    maybe_write_run_trace(
        &repo_root,
        &parsed.report,
        &settings,
        counts,
        Some(started_at),
        serde_json::json!({ "return_code": diagnosis.return_code }),
    );
    diagnosis.return_code
}
