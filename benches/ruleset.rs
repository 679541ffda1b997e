#[macro_use]
extern crate bencher;
extern crate magic5;

use bencher::Bencher;
use magic5::{RuleSet, Silent};

const SAMPLE: &[u8] = include_bytes!("../tests/data/sample.magic");

fn from_u8(b: &mut Bencher) {
    b.bytes = SAMPLE.len() as u64;
    b.iter(|| RuleSet::from_u8(SAMPLE, &mut Silent));
}

fn graph(b: &mut Bencher) {
    let rules = RuleSet::from_u8(SAMPLE, &mut Silent);
    b.iter(|| rules.graph());
}

benchmark_group!(ruleset, from_u8, graph);
benchmark_main!(ruleset);
