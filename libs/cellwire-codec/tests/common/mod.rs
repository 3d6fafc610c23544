#![allow(dead_code)]

use cellwire_api::{Cell, Durability, KeyType, Mutation, TimeRange};
use cellwire_codec::PluginRegistry;

/// Put with row `r1`, one cell `cf:q = v` at timestamp 100.
pub fn put_r1() -> Mutation {
    let mut put = Mutation::put("r1").unwrap().with_timestamp(100);
    put.add_column("cf", "q", "v");
    put
}

/// Put carrying value cells next to delete markers of every kind.
pub fn mixed_put() -> Mutation {
    let mut put = Mutation::put("row-7").unwrap().with_timestamp(50);
    put.add_column("a", "q1", "one")
        .add_column_at("a", "q2", 40, "two")
        .delete_column("a", "q3", 30)
        .delete_columns("b", "q4", 20)
        .delete_family("c", 10)
        .delete_family_version("d", 5);
    put.set_attribute("owner", "ops");
    put
}

pub fn delete_row() -> Mutation {
    let mut delete = Mutation::delete("gone").unwrap().with_durability(Durability::SkipWal);
    delete.delete_column("f", "q", 9).delete_family("g", 8);
    delete
}

pub fn increment() -> Mutation {
    let mut inc = Mutation::increment("counter")
        .unwrap()
        .with_time_range(TimeRange::new(10, 20).unwrap());
    inc.add_increment("f", "hits", 3).add_increment("f", "misses", -1);
    inc
}

pub fn append() -> Mutation {
    let mut append = Mutation::append("log").unwrap().with_durability(Durability::AsyncWal);
    append.add_column("f", "tail", "xyz");
    append
        .add_cell(Cell::new("log", "f", "tagged", 7, KeyType::Put, "t").with_tags("ttl=1"))
        .unwrap();
    append
}

pub fn value_cell(row: &'static str, qualifier: &'static str) -> Cell {
    Cell::new(row, "cf", qualifier, 1, KeyType::Put, "v")
}

/// Registry with every bundled filter and comparator.
pub fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    cellwire_comparator_binary::register(&mut registry);
    cellwire_filter_prefix::register(&mut registry);
    registry
}
