//! Conversion Benchmark
//!
//! Measures code generation throughput across feature levels.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rbjs_common::EsLevel;
use rbjs_emitter::{ConvertOptions, Pipeline};
use rbjs_tree::{Node, parse_sexp};

// =============================================================================
// Test Trees
// =============================================================================

const SIMPLE_TREE: &str = r#"
(begin
  (def :add (args (arg :a) (arg :b)) (send (lvar :a) :+ (lvar :b)))
  (lvasgn :result (send nil :add (int 1) (int 2)))
  (send nil :puts (lvar :result)))
"#;

const CLASS_TREE: &str = r#"
(module (const nil :Shapes)
  (begin
    (casgn nil :SCALE (int 2))
    (class (const nil :Point) (const nil :Base)
      (begin
        (send nil :attr_accessor (sym :label))
        (def :initialize (args (arg :x) (arg :y))
          (begin (zsuper) (ivasgn :@x (lvar :x)) (ivasgn :@y (lvar :y))))
        (def@8:4 :norm (args)
          (send (send (ivar :@x) :** (int 2)) :+ (send (ivar :@y) :** (int 2))))
        (def :scale (args (optarg :by (const nil :SCALE)))
          (begin
            (op_asgn (ivasgn :@x) :* (lvar :by))
            (op_asgn (ivasgn :@y) :* (lvar :by))
            (self)))))))
"#;

const CONTROL_FLOW_TREE: &str = r#"
(begin
  (masgn (mlhs (lvasgn :low) (lvasgn :high)) (array (int 0) (int 10)))
  (for (lvasgn :i) (irange (lvar :low) (lvar :high))
    (if (send (send (lvar :i) :% (int 2)) :== (int 0))
      (send nil :puts (dstr (str "even ") (begin (lvar :i))))
      (next)))
  (while (lvasgn :line (send nil :gets))
    (block (send (send (lvar :line) :split) :each) (args (arg :word))
      (or_asgn (lvasgn :seen) (hash))))
  (kwbegin
    (rescue (send nil :risky)
      (resbody (array (const nil :IOError)) (lvasgn :e) (send nil :warn (lvar :e)))
      nil)))
"#;

fn load(source: &str) -> Node {
    parse_sexp(source).expect("benchmark tree parses")
}

fn bench_convert_simple(c: &mut Criterion) {
    let tree = load(SIMPLE_TREE);
    let pipeline = Pipeline::new(ConvertOptions::with_es_level(EsLevel::Es2015));
    c.bench_function("convert_simple", |b| {
        b.iter(|| black_box(pipeline.convert(black_box(&tree)).expect("converts")))
    });
}

fn bench_convert_levels(c: &mut Criterion) {
    let trees = [("classes", load(CLASS_TREE)), ("control_flow", load(CONTROL_FLOW_TREE))];
    let mut group = c.benchmark_group("convert_levels");
    for (name, tree) in &trees {
        for level in [EsLevel::Es5, EsLevel::Es2015, EsLevel::Es2022] {
            let pipeline = Pipeline::new(ConvertOptions::with_es_level(level));
            let bytes = pipeline.convert(tree).map(|js| js.len() as u64).unwrap_or(0);
            group.throughput(Throughput::Bytes(bytes));
            group.bench_with_input(BenchmarkId::new(*name, level), tree, |b, tree| {
                b.iter(|| black_box(pipeline.convert(tree)))
            });
        }
    }
    group.finish();
}

fn bench_normalize_only(c: &mut Criterion) {
    let tree = load(CONTROL_FLOW_TREE);
    let pipeline = Pipeline::new(ConvertOptions::default());
    c.bench_function("normalize_identity", |b| {
        b.iter(|| black_box(pipeline.normalize(black_box(&tree)).expect("normalizes")))
    });
}

criterion_group!(benches, bench_convert_simple, bench_convert_levels, bench_normalize_only);

criterion_main!(benches);
