//! `fields` selectors sent with every request.
//!
//! YouTrack only returns `id` and `$type` unless attributes are listed
//! explicitly. Nested entities use `name(attr,attr)` syntax. The custom field
//! value attributes cover enum, user, period and text fields.

/// Full issue, used by `get` and after mutations.
pub const ISSUE: &str = "id,idReadable,summary,description,created,updated,resolved,\
project(id,name,shortName),reporter(id,login,fullName),tags(id,name),\
customFields(name,value(name,login,fullName,presentation,minutes,text))";

/// Issue rows for list output; omits the description.
pub const ISSUE_LIST: &str = "id,idReadable,summary,created,updated,resolved,\
project(id,name,shortName),tags(id,name),\
customFields(name,value(name,login,fullName,presentation,minutes,text))";

/// Project attributes.
pub const PROJECT: &str = "id,name,shortName,description,archived,leader(id,login,fullName)";

/// User attributes.
pub const USER: &str = "id,login,fullName,email,banned";

/// Tag attributes.
pub const TAG: &str = "id,name";

/// Comment attributes.
pub const COMMENT: &str = "id,text,created,updated,author(id,login,fullName)";

/// Work item attributes.
pub const WORK_ITEM: &str =
    "id,date,text,duration(minutes,presentation),type(id,name),author(id,login,fullName)";

/// Attachment attributes.
pub const ATTACHMENT: &str = "id,name,size,mimeType,url,created,author(id,login,fullName)";

/// Link attributes, including the linked issues.
pub const LINK: &str =
    "direction,linkType(name,sourceToTarget,targetToSource),issues(id,idReadable,summary,resolved)";
