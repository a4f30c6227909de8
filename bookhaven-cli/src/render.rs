//! Plain-text rendering of store state

use bookhaven_common::NotificationKind;
use bookhaven_core::stores::Notification;
use bookhaven_core::{CatalogDetail, CatalogItem};

pub fn print_items(items: &[CatalogItem], is_saved: impl Fn(&str) -> bool) {
    if items.is_empty() {
        println!("No books.");
        return;
    }
    for item in items {
        let marker = if is_saved(&item.id) { "*" } else { " " };
        let year = item.year.as_deref().unwrap_or("----");
        let mut line = format!("{marker} {:<12} {year}  {}", item.id, item.title);
        if !item.authors.is_empty() {
            line.push_str(&format!(" - {}", item.authors.join(", ")));
        }
        if let Some(rating) = item.rating {
            line.push_str(&format!(" ({rating:.1})"));
        }
        println!("{line}");
    }
}

pub fn print_detail(detail: &CatalogDetail, saved: bool) {
    let saved = if saved { " [saved]" } else { "" };
    println!("{} ({}){saved}", detail.title, detail.id);
    if let Some(year) = detail.first_publish_year {
        println!("First published: {year}");
    }
    println!("Cover: {}", detail.image_url);
    if !detail.subjects.is_empty() {
        println!("Subjects: {}", detail.subjects.join(", "));
    }
    if let Some(description) = &detail.description {
        println!();
        println!("{description}");
    }
    println!();
}

pub fn print_notification(notification: &Notification) {
    let Some(message) = notification.message.as_deref() else {
        return;
    };
    if !notification.visible {
        return;
    }
    let prefix = match notification.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Info => "i",
        NotificationKind::Warning => "!",
    };
    println!("{prefix} {message}");
}
