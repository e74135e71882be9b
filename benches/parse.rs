use divan::{Bencher, black_box};
use parsetools::{Segmenter, parse};

fn main() {
    divan::main();
}

const SENTENCE: &str = "(ROOT (S (NP (NP (DT The) (NN strongest) (NN rain)) (VP (ADVP (RB ever)) (VBN recorded) (PP (IN in) (NP (NNP India))))) (VP (VBD shut) (PRT (RP down)) (NP (NP (DT the) (JJ financial) (NN hub)) (PP (IN of) (NP (NNP Mumbai))))) (. .)))";

/// Build a multi-line corpus of `n` pretty-printed records
fn corpus(n: usize) -> String {
    let record = SENTENCE.replace(" (", "\n  (");
    let mut text = String::new();
    for _ in 0..n {
        text.push_str(&record);
        text.push_str("\n\n");
    }
    text
}

#[divan::bench]
fn parse_sentence(bencher: Bencher) {
    bencher.bench_local(|| parse(black_box(SENTENCE)).unwrap());
}

#[divan::bench(args = [10, 100, 1000])]
fn segment_and_parse(bencher: Bencher, n: usize) {
    let text = corpus(n);
    bencher.bench_local(|| {
        for record in Segmenter::new(black_box(&text).lines()) {
            black_box(parse(&record.text).unwrap());
        }
    });
}
