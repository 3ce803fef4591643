/// Group-By Example
///
/// This example demonstrates:
/// - Appending rows whose fields appear over time
/// - Sorting by a column and reading rows in sorted order
/// - Grouping with built-in and custom reducers
/// - Merging a second dataset and viewing a subset of rows

use cdset::{row, Aggregate, Dataset, Distribution, PartialView, Value};

fn main() {
    println!("=== cdset Group-By Example ===\n");

    // 1. Add rows
    println!("1. Adding rows...");
    let mut tweets = Dataset::new();
    tweets.append(row! { "user" => "ann", "words" => 12 }).unwrap();
    tweets.append(row! { "user" => "bob", "words" => 7 }).unwrap();
    // A new field: earlier rows read it as null
    tweets.append(row! { "user" => "ann", "words" => 3, "place" => "delft" }).unwrap();
    tweets.append(row! { "user" => "cyd", "words" => 21, "place" => "leiden" }).unwrap();
    tweets.append(row! { "user" => "bob", "words" => 5, "place" => "delft" }).unwrap();
    println!("   {} rows, columns {:?}\n", tweets.len(), tweets.column_names());

    // 2. Schema drift is rejected
    println!("2. Appending a row without 'place'...");
    match tweets.append(row! { "user" => "dan", "words" => 1 }) {
        Ok(()) => println!("   unexpectedly accepted"),
        Err(e) => println!("   rejected: {}", e),
    }
    println!("   still {} rows\n", tweets.len());

    // 3. Sorted access
    println!("3. Rows by word count...");
    tweets.sort("words").unwrap();
    for rank in 0..tweets.len() {
        let row = tweets.sorted_item(rank).unwrap();
        println!("   {}: {} ({} words)", rank, row["user"], row["words"]);
    }
    println!();

    // 4. Group by user
    println!("4. Words per user...");
    let totals = tweets
        .group_by("user", "words", |run| Aggregate::Sum.reduce(run))
        .unwrap();
    for (user, total) in &totals {
        println!("   {}\t{}", user, total);
    }
    println!();

    println!("5. Places per user...");
    let places = tweets
        .group_by("user", "place", Distribution::from_values)
        .unwrap();
    for (user, dist) in &places {
        let parts: Vec<String> = dist.iter().map(|(v, c)| format!("{}={}", v, c)).collect();
        println!("   {}\t{}", user, parts.join(" "));
    }
    println!();

    // 6. Merge a derived column and view a subset
    println!("6. Merging a 'long' flag and listing long tweets...");
    let mut flags = Dataset::new();
    for row in tweets.iter_rows().collect::<Vec<_>>() {
        let long = row["words"].as_i64().unwrap_or(0) >= 10;
        flags.append(row! { "long" => if long { 1 } else { 0 } }).unwrap();
    }
    tweets.merge(flags).unwrap();

    let long_ids: Vec<usize> = tweets
        .column("long")
        .unwrap()
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == Value::Integer(1))
        .map(|(i, _)| i)
        .collect();
    for row in PartialView::new(&tweets, &long_ids).iter() {
        let row = row.unwrap();
        println!("   {} ({} words)", row["user"], row["words"]);
    }

    println!("\n7. As JSON lines:");
    print!("{}", tweets.to_json_lines().unwrap());

    println!("\n=== Example Complete ===");
}
