// private sub-module defined in other files
mod d8_pointer;
mod fill_pits;
mod mean_drop;
mod sum_downstream;
mod top_index;
mod total_contributing_area;

// exports identifiers from private sub-modules in the current module namespace
pub use self::d8_pointer::D8Pointer;
pub use self::fill_pits::FillPits;
pub use self::mean_drop::MeanDrop;
pub use self::sum_downstream::SumDownstream;
pub use self::top_index::TopIndex;
pub use self::total_contributing_area::TotalContributingArea;
