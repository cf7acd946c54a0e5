//! Reply queries
//!
//! Pure functions that build the text of `get*` and `find*` replies from a
//! restriction store, a shared folder snapshot or the current outfit.

mod folders;
mod status;

pub use folders::{
    find_folder, find_folders, get_inv, get_inv_worn, get_paths, worn_code, FolderSearch,
    WornStatus,
};
pub use status::{get_attach, get_blacklist, get_outfit, get_status};
