use criterion::{Criterion, black_box, criterion_group, criterion_main};

use redlilium_edit::{
    Change, ChangeResult, ChangeSignal, Editable, Filter, History, Target, is_change,
};

#[derive(Debug, Default)]
struct Counter {
    value: i64,
}

impl Editable for Counter {}

#[derive(Debug)]
struct Add(i64);

impl Change<Counter> for Add {
    fn apply(&mut self, target: &mut Counter) -> ChangeResult {
        target.value += self.0;
        Ok(())
    }

    fn revert(&mut self, target: &mut Counter) -> ChangeResult {
        target.value -= self.0;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn bench_history_add_at_capacity(c: &mut Criterion) {
    let mut counter = Counter::default();
    let mut history = History::new(100);
    for _ in 0..100 {
        let _ = history.add(Box::new(Add(1)), &mut counter);
    }
    c.bench_function("history_add_at_capacity_100", |b| {
        b.iter(|| black_box(history.add(Box::new(Add(black_box(1))), &mut counter)));
    });
}

fn bench_history_undo_redo(c: &mut Criterion) {
    let mut counter = Counter::default();
    let mut history = History::new(100);
    for _ in 0..100 {
        let _ = history.add(Box::new(Add(1)), &mut counter);
    }
    c.bench_function("history_undo_redo", |b| {
        b.iter(|| {
            let _ = black_box(history.undo(&mut counter));
            let _ = black_box(history.redo(&mut counter));
        });
    });
}

// ---------------------------------------------------------------------------
// Signal taxonomy
// ---------------------------------------------------------------------------

fn bench_is_change_deep_chain(c: &mut Criterion) {
    let root = ChangeSignal::leaf("root");
    let mut leaf = root.clone();
    for _ in 0..16 {
        leaf = ChangeSignal::extended(&leaf, "extended");
    }
    c.bench_function("is_change_chain_16", |b| {
        b.iter(|| black_box(is_change(black_box(&leaf), black_box(&root))));
    });
}

fn bench_is_change_multi(c: &mut Criterion) {
    let wanted = ChangeSignal::leaf("wanted");
    let members: Vec<_> = (0..32).map(|_| ChangeSignal::leaf("member")).collect();
    let multi = ChangeSignal::multi(members);
    c.bench_function("is_change_multi_32_miss", |b| {
        b.iter(|| black_box(is_change(black_box(&multi), black_box(&wanted))));
    });
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn bench_signal_unfiltered(c: &mut Criterion) {
    let target = Target::new();
    let signal = ChangeSignal::leaf("width");
    let subscriptions: Vec<_> = (0..64)
        .map(|_| {
            target.subscribe(
                |change: &ChangeSignal| {
                    black_box(change);
                },
                [],
            )
        })
        .collect();
    c.bench_function("signal_change_64_subscribers", |b| {
        b.iter(|| target.signal_change(black_box(&signal)));
    });
    for subscription in &subscriptions {
        subscription.delete();
    }
}

fn bench_signal_filtered(c: &mut Criterion) {
    let target = Target::new();
    let width = ChangeSignal::leaf("width");
    let height = ChangeSignal::leaf("height");
    let subscriptions: Vec<_> = (0..64)
        .map(|_| {
            target.subscribe(
                |change: &ChangeSignal| {
                    black_box(change);
                },
                [Filter::is(&height)],
            )
        })
        .collect();
    c.bench_function("signal_change_64_filtered_out", |b| {
        b.iter(|| target.signal_change(black_box(&width)));
    });
    for subscription in &subscriptions {
        subscription.delete();
    }
}

fn bench_batch_flush(c: &mut Criterion) {
    let target = Target::new();
    let signals: Vec<_> = (0..16).map(|_| ChangeSignal::leaf("field")).collect();
    let subscription = target.subscribe(
        |change: &ChangeSignal| {
            black_box(change.members().len());
        },
        [],
    );
    c.bench_function("batch_flush_16_signals", |b| {
        b.iter(|| {
            let batch = target.begin_batch();
            for signal in &signals {
                target.signal_change(signal);
            }
            batch.commit();
        });
    });
    subscription.delete();
}

criterion_group!(
    benches,
    bench_history_add_at_capacity,
    bench_history_undo_redo,
    bench_is_change_deep_chain,
    bench_is_change_multi,
    bench_signal_unfiltered,
    bench_signal_filtered,
    bench_batch_flush,
);
criterion_main!(benches);
