#![no_main]

use csvarena_core::{Arena, Table};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let arena = Arena::with_region_capacity(256);
    if let Ok(table) = Table::parse(&arena, data) {
        let width = table.column_count();
        assert!(table.rows().iter().all(|row| row.len() == width));
        for column in table.columns() {
            if let Ok(name) = column.name.as_str() {
                assert!(table.column_index_of(name).is_some());
            }
            for row in 0..table.row_count() {
                // conversion may fail (overflow) but must not panic
                let _ = table.value_at(row, column.ordinal);
            }
        }
    }
});
