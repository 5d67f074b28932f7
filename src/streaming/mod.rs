pub mod debounce;
pub mod reassembler;
pub mod sections;
pub mod tags;

pub use debounce::Debouncer;
pub use reassembler::{StreamAccumulator, StreamReassembler, StreamStatus, frame_payload};
pub use sections::{
    SECTION_TABLE, SectionKind, SectionMarker, SectionMatch, SectionParser, SectionSpec,
    parse_sections,
};
pub use tags::extract_tags;
