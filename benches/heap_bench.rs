//! Heap benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use segalloc::{GlobalHeap, Heap};

fn bench_alloc_free_cycle(
  c: &mut Criterion,
) {
  let sizes: &[usize] = &[16, 64, 256, 1024, 2048];
  let mut group = c.benchmark_group("alloc_free_cycle");

  for &size in sizes {
    group.bench_with_input(BenchmarkId::new("heap", size), &size, |b, &sz| {
      let mut heap = Heap::new();
      b.iter(|| {
        let ptr = heap.allocate(criterion::black_box(sz));
        unsafe { heap.free(ptr.as_ptr()).unwrap() };
      });
    });

    group.bench_with_input(BenchmarkId::new("global_heap", size), &size, |b, &sz| {
      let heap = GlobalHeap::new();
      b.iter(|| {
        let ptr = heap.allocate(criterion::black_box(sz));
        unsafe { heap.free(ptr.as_ptr()).unwrap() };
      });
    });

    group.bench_with_input(BenchmarkId::new("system", size), &size, |b, &sz| {
      b.iter(|| {
        let v = vec![0u8; sz];
        criterion::black_box(v);
      });
    });
  }
  group.finish();
}

fn bench_alloc_burst(
  c: &mut Criterion,
) {
  let mut group = c.benchmark_group("alloc_burst");

  group.bench_function("1000x64B", |b| {
    let mut heap = Heap::new();
    let mut live = Vec::with_capacity(1000);
    b.iter(|| {
      for _ in 0..1000 {
        live.push(heap.allocate(64));
      }
      for ptr in live.drain(..) {
        unsafe { heap.free(ptr.as_ptr()).unwrap() };
      }
    });
  });

  group.finish();
}

criterion_group!(benches, bench_alloc_free_cycle, bench_alloc_burst);
criterion_main!(benches);
