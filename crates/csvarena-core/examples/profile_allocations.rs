/// Heap allocation profiler using dhat
///
/// Parses tables of increasing size to show that heap traffic follows the
/// number of arena regions, not the number of cells.
///
/// Usage:
/// ```bash
/// cargo run --release --example profile_allocations
/// ```
///
/// Output: dhat-heap.json (open with https://nnethercote.github.io/dh_view/dh_view.html)
use csvarena_core::{Arena, Table};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn build_input(rows: usize, columns: usize) -> String {
    let header: Vec<String> = (0..columns).map(|c| format!("col{c}")).collect();
    let mut text = header.join(",");
    text.push('\n');
    for r in 0..rows {
        let row: Vec<String> = (0..columns).map(|c| (r * columns + c).to_string()).collect();
        text.push_str(&row.join(","));
        text.push('\n');
    }
    text
}

fn profile(label: &str, input: &str) {
    let before = dhat::HeapStats::get();
    let arena = Arena::new();
    match Table::parse(&arena, input.as_bytes()) {
        Ok(table) => {
            let after = dhat::HeapStats::get();
            println!(
                "{label}: {} rows x {} columns, {} heap blocks, {} regions, {} arena bytes",
                table.row_count(),
                table.column_count(),
                after.total_blocks - before.total_blocks,
                arena.region_count(),
                arena.allocated_bytes()
            );
        }
        Err(e) => println!("{label}: parse failed: {e}"),
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("Profiling csvarena parse allocations...");
    println!();

    for (rows, columns) in [(10, 4), (1_000, 4), (100_000, 4), (10_000, 40)] {
        let input = build_input(rows, columns);
        profile(&format!("{rows}x{columns}"), &input);
    }

    println!();
    println!("Results written to: dhat-heap.json");
}
