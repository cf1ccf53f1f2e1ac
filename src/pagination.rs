// src/pagination.rs
use crate::models::Pagination;

/// Ile stron wokół bieżącej pokazujemy jako przyciski.
const WINDOW: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    Page { number: u32, current: bool },
    Gap,
}

/// Lista przycisków paginacji: pierwsza i ostatnia strona, okno wokół bieżącej, a przerwy jako `Gap`.
pub fn page_slots(pagination: &Pagination) -> Vec<PageSlot> {
    let total = pagination.total_pages.max(1);
    let current = pagination.current_page.clamp(1, total);

    let mut slots = Vec::new();
    let mut previous: Option<u32> = None;
    for number in 1..=total {
        let visible = number == 1
            || number == total
            || (number + WINDOW >= current && number <= current + WINDOW);
        if !visible {
            continue;
        }
        if let Some(prev) = previous {
            if number > prev + 1 {
                slots.push(PageSlot::Gap);
            }
        }
        slots.push(PageSlot::Page {
            number,
            current: number == current,
        });
        previous = Some(number);
    }
    slots
}
