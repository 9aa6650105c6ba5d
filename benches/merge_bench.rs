use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use corpus_merge::annotation::{Annotate, Document, Entity, Rules, Sentence, Token};
use corpus_merge::labels::Labels;
use corpus_merge::merge::Merger;
use corpus_merge::sanitize::sanitize;

const NB_LINES: usize = 1000;

fn lines(nb: usize) -> Vec<String> {
    (0..nb)
        .map(|x| {
            format!(
                "*Comment {}*: read [the post](https://example.com/{}) about New York City, then reply!",
                x, x
            )
        })
        .collect()
}

// "Ada Lovelace wrote the first program ." with its parse
fn parsed_document(nb_sentences: usize) -> Document {
    let tokens = [
        ("Ada", "PROPN", "compound", 1, "PERSON"),
        ("Lovelace", "PROPN", "nsubj", 2, "PERSON"),
        ("wrote", "VERB", "ROOT", 2, ""),
        ("the", "DET", "det", 5, ""),
        ("first", "ADJ", "amod", 5, ""),
        ("program", "NOUN", "dobj", 2, ""),
        (".", "PUNCT", "punct", 2, ""),
    ];
    let sentence = Sentence::new(
        tokens
            .iter()
            .map(|(text, pos, dep, head, ent_type)| Token {
                text: text.to_string(),
                whitespace: " ".to_string(),
                pos: pos.to_string(),
                dep: dep.to_string(),
                head: Some(*head),
                ent_type: ent_type.to_string(),
                ..Default::default()
            })
            .collect(),
        vec![Entity::new(0, 2, "PERSON")],
    );
    Document::new(vec![sentence; nb_sentences])
}

fn bench_merge(c: &mut Criterion) {
    let labels = Labels::default();
    let mut group = c.benchmark_group("Merge");

    let raw = lines(NB_LINES);
    group.bench_function("sanitize", |b| {
        b.iter(|| raw.iter().map(|l| sanitize(l)).count())
    });

    for threads in [1, 4] {
        let mut rules = Rules::new(threads).unwrap();
        let cleaned: Vec<String> = raw.iter().map(|l| sanitize(l)).collect();
        group.bench_with_input(
            BenchmarkId::new("rules annotation", threads),
            &cleaned,
            |b, cleaned| b.iter(|| rules.annotate(cleaned).unwrap()),
        );
    }

    for noun_chunks in [false, true] {
        let merger = Merger::new(&labels, noun_chunks);
        let doc = parsed_document(100);
        group.bench_with_input(
            BenchmarkId::new("transform (noun chunks)", noun_chunks),
            &doc,
            |b, doc| b.iter(|| merger.transform(doc)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
