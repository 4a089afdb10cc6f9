//! Shared test utilities for integration tests
//!
//! Writes a small tenant export into a temporary directory: one user,
//! one auto attendant with a three-option menu, a numbered queue, a
//! number-less queue, and an inventory number nobody holds.

#![allow(dead_code)]

use assert_fs::prelude::*;

pub const USER_NUMBER: &str = "+19845551234";
pub const ATTENDANT_NUMBER: &str = "+18005550100";
pub const QUEUE_NUMBER: &str = "+18005551111";
pub const SPARE_NUMBER: &str = "+15550000000";

const VOICE_ROUTING: &str = r#"{
  "PhoneNumberAssignments": [
    { "TelephoneNumber": "+19845551234", "NumberType": "User", "PstnAssignmentStatus": "UserAssigned" },
    { "TelephoneNumber": "+15550000000", "NumberType": "User", "PstnAssignmentStatus": "Unassigned" }
  ],
  "VoiceRoutingPolicies": [ { "Identity": "Global" } ]
}"#;

const USER_SETTINGS: &str = r#"{
  "VoiceUserSettings": [
    {
      "LineURI": "tel:+19845551234",
      "UserPrincipalName": "alex@contoso.com",
      "DisplayName": "Alex Wilber",
      "VoiceRoutingPolicy": { "Name": "RoutePolicy1" },
      "EnterpriseVoiceEnabled": true
    }
  ]
}"#;

const CALL_QUEUES: &str = r#"{
  "CallQueuePermissions": [
    {
      "CallQueueId": "q1",
      "CallQueueName": "Sales",
      "ResourceAccount": "sales@contoso.com",
      "PhoneNumber": "+18005551111"
    }
  ],
  "CallQueueDetails": [
    {
      "Identity": "q1",
      "Name": "Sales",
      "RoutingMethod": 2,
      "TimeoutThreshold": 120,
      "TimeoutAction": 2,
      "Agents": ["a1", "a2"]
    },
    {
      "Identity": "q2",
      "Name": "Billing",
      "RoutingMethod": 3,
      "Agents": [ { "ObjectId": "a3" } ]
    }
  ]
}"#;

const AUTO_ATTENDANTS: &str = r#"{
  "AutoAttendantPermissions": [
    {
      "AutoAttendantId": "aa1",
      "AutoAttendantName": "Main",
      "ResourceAccount": "main@contoso.com",
      "PhoneNumber": "+18005550100"
    }
  ],
  "AutoAttendantDetails": [
    {
      "Identity": "aa1",
      "Name": "Main",
      "LanguageId": "en-US",
      "DefaultCallFlow": {
        "Name": "Business hours",
        "Menu": {
          "MenuOptions": [
            { "DtmfResponse": 1, "Action": 1, "CallTarget": { "Id": "q1", "Type": 2 } },
            { "DtmfResponse": 2, "Action": 1, "CallTarget": { "Id": "q2", "Type": 2 } },
            { "DtmfResponse": 12, "Action": 0 }
          ]
        }
      }
    }
  ]
}"#;

/// Temp directory holding the sample tenant export files.
pub fn make_tenant_fixture() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    for (name, body) in [
        ("VoiceRouting.json", VOICE_ROUTING),
        ("UserSettings.json", USER_SETTINGS),
        ("CallQueues.json", CALL_QUEUES),
        ("AutoAttendants.json", AUTO_ATTENDANTS),
    ]
    {
        tmp.child(name)
            .write_str(body)
            .expect("write export");
    }

    tmp
}
