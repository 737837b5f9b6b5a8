use brief_tui::editor::{DocumentEditor, Selection};
use brief_tui::html::{ParseOptions, parse_document, serialize_document};
use brief_tui::render::{self, RenderState};
use brief_tui::sentences::split_into_sentences;
use brief_tui::theme::Theme;
use std::time::{Duration, Instant};

/// Performance benchmark suite for the brief editor
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Sentence splitting of citation-heavy prose
/// - Markup parsing into blocks
/// - Serializing blocks back to markup
/// - Document rendering
/// - Table of Authorities placement
const SMALL_DOC_PARAGRAPHS: usize = 10;
const MEDIUM_DOC_PARAGRAPHS: usize = 100;
const LARGE_DOC_PARAGRAPHS: usize = 1000;

const ITERATIONS: usize = 100;

const SAMPLE_SENTENCES: &[&str] = &[
    "Summary judgment is appropriate when there is no genuine dispute as to any material fact.",
    "Anderson v. Liberty Lobby, Inc., 477 U.S. 242 (1986).",
    "The moving party bears the initial burden of demonstrating the absence of a genuine issue.",
    "Celotex Corp. v. Catrett, 477 U.S. 317 (1986).",
    "Property owners owe a duty of reasonable care to invitees.",
    "Rowland v. Christian, 69 Cal. 2d 108 (1968).",
    "Dr. Lee relies on limited site data from the U.S. facility.",
];

/// Create markup with the specified number of paragraphs, every fifth one a
/// section heading and every seventh a tracked insertion.
fn create_test_markup(num_paragraphs: usize, sentences_per_para: usize) -> String {
    let mut html = String::new();

    for i in 0..num_paragraphs {
        if i % 5 == 0 {
            html.push_str(&format!("<h2>SECTION {}</h2>", i / 5 + 1));
            continue;
        }

        let mut text = String::new();
        for j in 0..sentences_per_para {
            if j > 0 {
                text.push(' ');
            }
            text.push_str(SAMPLE_SENTENCES[(i + j) % SAMPLE_SENTENCES.len()]);
        }

        if i % 7 == 0 {
            html.push_str(&format!(
                r#"<p style="text-align: justify;"><ins data-insertion="true">{text}</ins></p>"#
            ));
        } else {
            html.push_str(&format!(r#"<p style="text-align: justify;">{text}</p>"#));
        }
    }

    html
}

fn docs() -> Vec<(&'static str, String)> {
    vec![
        ("Small (10 paras)", create_test_markup(SMALL_DOC_PARAGRAPHS, 6)),
        ("Medium (100 paras)", create_test_markup(MEDIUM_DOC_PARAGRAPHS, 6)),
        ("Large (1000 paras)", create_test_markup(LARGE_DOC_PARAGRAPHS, 6)),
    ]
}

fn iterations_for(name: &str) -> usize {
    if name.contains("Large") {
        10
    } else {
        ITERATIONS
    }
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
        println!(
            "Ops/sec:        {:.2}",
            1_000_000.0 / self.avg_duration.as_micros().max(1) as f64
        );

        if self.avg_duration.as_millis() > 100 {
            println!("\n⚠️  WARNING: Average duration > 100ms (user-perceptible lag)");
        } else if self.avg_duration.as_millis() > 16 {
            println!("\n⚠️  WARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn banner(title: &str) {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╚════════════════════════════════════════════════════════════════╝");
}

#[test]
fn bench_sentence_splitting() {
    banner("SENTENCE SPLITTING BENCHMARKS");

    let samples = vec![
        ("One paragraph", SAMPLE_SENTENCES.join(" ")),
        ("Ten paragraphs", vec![SAMPLE_SENTENCES.join(" "); 10].join(" ")),
    ];

    for (name, text) in samples {
        let result = benchmark(
            &format!("split_into_sentences - {}", name),
            ITERATIONS * 10,
            || {
                let _ = split_into_sentences(&text);
            },
        );
        result.print();
    }
}

#[test]
fn bench_parsing() {
    banner("MARKUP PARSING BENCHMARKS");

    let options = ParseOptions::default();
    for (name, html) in docs() {
        let result = benchmark(
            &format!("parse_document - {}", name),
            iterations_for(name),
            || {
                let _ = parse_document(&html, &options);
            },
        );
        result.print();
    }
}

#[test]
fn bench_serialization() {
    banner("SERIALIZATION BENCHMARKS");

    let options = ParseOptions::default();
    for (name, html) in docs() {
        let document = parse_document(&html, &options);
        let result = benchmark(
            &format!("serialize_document - {}", name),
            iterations_for(name),
            || {
                let _ = serialize_document(&document);
            },
        );
        result.print();
    }
}

#[test]
fn bench_rendering() {
    banner("RENDERING BENCHMARKS");

    let options = ParseOptions::default();
    let theme = Theme::new();
    for (name, html) in docs() {
        let document = parse_document(&html, &options);
        let selection: Selection = document.sentences().step_by(3).map(|s| s.id).collect();
        let focus = document.sentences().nth(4).map(|s| s.id);

        let result = benchmark(
            &format!("render_document - {}", name),
            iterations_for(name),
            || {
                let state = RenderState {
                    focus,
                    selection: &selection,
                    placement_preview: None,
                    theme: &theme,
                };
                let _ = render::render_document(&document, 80, &state);
            },
        );
        result.print();
    }
}

#[test]
fn bench_rendering_while_placing() {
    banner("RENDERING DURING TOA PLACEMENT BENCHMARKS");

    let theme = Theme::new();
    let selection = Selection::new();
    let document = parse_document(
        &create_test_markup(MEDIUM_DOC_PARAGRAPHS, 6),
        &ParseOptions::default(),
    );
    let slots = document.placement_slots();

    let result = benchmark("render_document - preview sweep", ITERATIONS, || {
        for preview in slots.iter().step_by(10) {
            let state = RenderState {
                focus: None,
                selection: &selection,
                placement_preview: Some(*preview),
                theme: &theme,
            };
            let _ = render::render_document(&document, 80, &state);
        }
    });
    result.print();

    println!("\n💡 NOTE: Placement re-renders on every Up/Down keypress!");
}

#[test]
fn bench_toa_placement() {
    banner("TABLE OF AUTHORITIES BENCHMARKS");

    for (name, html) in docs() {
        let document = parse_document(&html, &ParseOptions::default());
        let citations: Selection = document
            .sentences()
            .filter(|s| s.text.contains(" v. "))
            .map(|s| s.id)
            .collect();
        let mut editor = DocumentEditor::new(document, "passim");
        editor.mark_citation(&citations).unwrap();

        let result = benchmark(
            &format!("place_at + update - {}", name),
            iterations_for(name),
            || {
                editor.place_at(0).unwrap();
                editor.update_from_current_citations().unwrap();
            },
        );
        result.print();
    }
}
