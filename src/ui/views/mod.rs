mod homeworld_detail;
mod people_list;

pub use homeworld_detail::HomeworldDetailView;
pub use people_list::PeopleListView;
